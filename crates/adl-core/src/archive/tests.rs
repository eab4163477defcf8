use std::io::{Cursor, Read};

use chrono::NaiveDate;

use super::*;
use crate::checksum::crc32;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DosDateTime {
    let date = NaiveDate::from_ymd_opt(y, mo, d).unwrap();
    DosDateTime::from_naive(date.and_hms_opt(h, mi, s).unwrap())
}

fn body(i: usize) -> Vec<u8> {
    (0..(200 + i * 53)).map(|b| (b * 7 + i) as u8).collect()
}

#[test]
fn dos_time_packing() {
    let t = at(2024, 3, 9, 14, 5, 7);
    assert_eq!(t.date, (44 << 9) | (3 << 5) | 9);
    assert_eq!(t.time, (14 << 11) | (5 << 5) | 3);
    let back = t.to_naive().unwrap();
    assert_eq!(back, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(14, 5, 6).unwrap());
}

#[test]
fn dos_time_clamps_before_1980() {
    assert_eq!(at(1975, 6, 1, 12, 0, 0), DosDateTime::EPOCH);
    assert_eq!(
        DosDateTime::EPOCH.to_naive().unwrap(),
        NaiveDate::from_ymd_opt(1980, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn empty_archive_is_a_bare_end_record() {
    let mut buf = Vec::new();
    let summary = ZipStreamWriter::new(&mut buf).finish().await.unwrap();
    assert_eq!(summary, ArchiveSummary { entries: 0, bytes: EOCD_LEN as u64 });
    assert_eq!(buf.len(), EOCD_LEN);
    assert_eq!(&buf[..4], b"PK\x05\x06");

    let archive = zip::ZipArchive::new(Cursor::new(buf)).unwrap();
    assert_eq!(archive.len(), 0);
}

#[tokio::test]
async fn local_header_fields() {
    let mut buf = Vec::new();
    let mut w = ZipStreamWriter::new(&mut buf);
    let modified = at(2024, 3, 9, 14, 5, 7);
    w.add_entry("a.mp3", b"hello", modified).await.unwrap();
    drop(w);

    assert_eq!(&buf[0..4], b"PK\x03\x04");
    assert_eq!(u16::from_le_bytes([buf[4], buf[5]]), 20); // version needed
    assert_eq!(u16::from_le_bytes([buf[6], buf[7]]), 0); // flags
    assert_eq!(u16::from_le_bytes([buf[8], buf[9]]), 0); // stored
    assert_eq!(u16::from_le_bytes([buf[10], buf[11]]), modified.time);
    assert_eq!(u16::from_le_bytes([buf[12], buf[13]]), modified.date);
    assert_eq!(u32::from_le_bytes(buf[14..18].try_into().unwrap()), crc32(b"hello"));
    assert_eq!(u32::from_le_bytes(buf[18..22].try_into().unwrap()), 5);
    assert_eq!(u32::from_le_bytes(buf[22..26].try_into().unwrap()), 5);
    assert_eq!(u16::from_le_bytes([buf[26], buf[27]]), 5);
    assert_eq!(u16::from_le_bytes([buf[28], buf[29]]), 0);
    assert_eq!(&buf[30..35], b"a.mp3");
    assert_eq!(&buf[35..], b"hello");
}

#[tokio::test]
async fn entries_read_back_with_zip_crate() {
    let mut buf = Vec::new();
    let mut w = ZipStreamWriter::new(&mut buf);
    let names = ["01_intro.mp3", "02_chapter.mp3", "03_outro.mp3"];
    for (i, name) in names.iter().enumerate() {
        w.add_entry(name, &body(i), DosDateTime::now()).await.unwrap();
    }
    let summary = w.finish().await.unwrap();
    assert_eq!(summary.entries, 3);
    assert_eq!(summary.bytes, buf.len() as u64);

    let mut archive = zip::ZipArchive::new(Cursor::new(buf)).unwrap();
    assert_eq!(archive.len(), 3);
    for (i, name) in names.iter().enumerate() {
        let mut file = archive.by_index(i).unwrap();
        assert_eq!(file.name(), *name);
        assert_eq!(file.compression(), zip::CompressionMethod::Stored);
        assert_eq!(file.size(), body(i).len() as u64);
        assert_eq!(file.crc32(), crc32(&body(i)));
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        assert_eq!(content, body(i));
    }
}

#[tokio::test]
async fn offsets_are_prefix_sums_of_emitted_entries() {
    let mut buf = Vec::new();
    let mut w = ZipStreamWriter::new(&mut buf);
    for i in 0..4 {
        w.add_entry(&format!("track_{}.mp3", i), &body(i), DosDateTime::EPOCH)
            .await
            .unwrap();
    }
    let mut expected = 0u64;
    for record in w.records() {
        assert_eq!(u64::from(record.offset), expected);
        expected += record.stored_len();
    }
    assert_eq!(w.bytes_written(), expected);

    let records = w.records().to_vec();
    w.finish().await.unwrap();
    for record in &records {
        let off = record.offset as usize;
        assert_eq!(&buf[off..off + 4], b"PK\x03\x04");
    }
}

#[tokio::test]
async fn non_ascii_names_set_utf8_flag() {
    let mut buf = Vec::new();
    let mut w = ZipStreamWriter::new(&mut buf);
    w.add_entry("Глава_1.mp3", b"x", DosDateTime::EPOCH).await.unwrap();
    w.finish().await.unwrap();
    assert_eq!(u16::from_le_bytes([buf[6], buf[7]]) & (1 << 11), 1 << 11);

    let mut archive = zip::ZipArchive::new(Cursor::new(buf)).unwrap();
    assert_eq!(archive.by_index(0).unwrap().name(), "Глава_1.mp3");
}

#[tokio::test]
async fn oversized_name_is_rejected_without_writing() {
    let mut buf = Vec::new();
    let mut w = ZipStreamWriter::new(&mut buf);
    w.add_entry("ok.mp3", b"data", DosDateTime::EPOCH).await.unwrap();
    let before = w.bytes_written();

    let long = "n".repeat(usize::from(u16::MAX) + 1);
    let err = w.add_entry(&long, b"data", DosDateTime::EPOCH).await.unwrap_err();
    assert!(matches!(err, ArchiveError::TooLarge { what: "entry name" }));
    assert_eq!(w.bytes_written(), before);
    assert_eq!(w.records().len(), 1);

    w.finish().await.unwrap();
    let archive = zip::ZipArchive::new(Cursor::new(buf)).unwrap();
    assert_eq!(archive.len(), 1);
}

#[tokio::test]
async fn entries_reach_the_reader_before_finish() {
    let (tx, mut rx) = tokio::io::duplex(64 * 1024);
    let mut w = ZipStreamWriter::new(tx);
    w.add_entry("first.mp3", &body(0), DosDateTime::EPOCH).await.unwrap();

    let mut head = vec![0u8; LOCAL_HEADER_LEN + "first.mp3".len() + body(0).len()];
    tokio::io::AsyncReadExt::read_exact(&mut rx, &mut head).await.unwrap();
    assert_eq!(&head[..4], b"PK\x03\x04");
    assert_eq!(&head[LOCAL_HEADER_LEN + 9..], &body(0)[..]);

    w.finish().await.unwrap();
    let mut rest = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut rx, &mut rest).await.unwrap();
    assert_eq!(rest.len(), CENTRAL_HEADER_LEN + 9 + EOCD_LEN);
}
