//! ZIP bundling of generated text files.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveResult;
use crate::export::manifest::NamedBlob;

/// Bundle named text files into a single ZIP byte buffer.
pub fn bundle(blobs: &[NamedBlob]) -> ArchiveResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for blob in blobs {
        writer.start_file(blob.filename.as_str(), options)?;
        writer.write_all(blob.content.as_bytes())?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn blob(name: &str, content: &str) -> NamedBlob {
        NamedBlob {
            filename: name.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_bundle_round_trip() {
        let blobs = vec![
            blob("estoque_list_TODOS.txt", "CODIGO;DESCRIÇÃO;QTDA;VALOR UNIT\nAUX1;P1;1;2.00\n"),
            blob("estoque_list_A.txt", "CODIGO;DESCRIÇÃO;QTDA;VALOR UNIT\n"),
        ];

        let bytes = bundle(&blobs).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name("estoque_list_TODOS.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert!(content.contains("AUX1;P1;1;2.00"));
    }

    #[test]
    fn test_bundle_empty_list() {
        let bytes = bundle(&[]).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
