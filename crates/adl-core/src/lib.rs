pub mod config;
pub mod logging;

pub mod adapter;
pub mod api;
pub mod archive;
pub mod broadcast;
pub mod checksum;
pub mod control;
pub mod downloader;
pub mod fetch;
pub mod job;
pub mod library;
pub mod pipeline;
pub mod storage;
pub mod track;
pub mod url_model;
