//! Payloads and temporary files for stream tests.

use std::io::{Seek, SeekFrom, Write};

/// Writes `contents` to a new temporary file, rewound to the start.
///
/// The file is deleted when the returned handle is dropped.
pub fn write_temp_file(contents: &[u8]) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(contents)?;
    file.flush()?;
    file.seek(SeekFrom::Start(0))?;
    Ok(file)
}

/// Incompressible bytes.
pub fn random_payload(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    fastrand::fill(&mut data);
    data
}

/// Bytes with short repeating runs that every codec shrinks.
pub fn compressible_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i / 16) % 13) as u8 + b'a').collect()
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::{compressible_payload, random_payload, write_temp_file};

    #[test]
    fn test_write_temp_file() {
        let data = random_payload(1000);
        let file = write_temp_file(&data).unwrap();
        let mut contents = Vec::new();
        std::fs::File::open(file.path())
            .unwrap()
            .read_to_end(&mut contents)
            .unwrap();
        assert_eq!(contents, data);
    }

    #[test]
    fn test_compressible_payload() {
        let data = compressible_payload(100);
        assert_eq!(data.len(), 100);
        assert_eq!(&data[..16], &[b'a'; 16]);
        assert_eq!(data[16], b'b');
    }
}
