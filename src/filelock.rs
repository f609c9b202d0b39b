use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use anyhow::Result;
use file_lock::FileLock;

/// Reads the whole file under a shared lock. Returns `None` if the file does not exist.
pub fn read_file_lock(path: &Path) -> Result<Option<Vec<u8>>> {
    let lock_opts = file_lock::FileOptions::new().read(true);
    let mut file = match FileLock::lock(path, true, lock_opts) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let mut data = Vec::new();
    file.file.read_to_end(&mut data)?;
    Ok(Some(data))
}

/// Replaces the file content under an exclusive lock, creating the file if needed.
pub fn write_file_lock(path: &Path, data: &[u8]) -> Result<()> {
    let lock_opts = file_lock::FileOptions::new()
        .write(true)
        .create(true);
    let mut file = FileLock::lock(path, true, lock_opts)?;
    // Truncate only after the lock is held, readers must never see a partial file.
    file.file.set_len(0)?;
    file.file.seek(SeekFrom::Start(0))?;
    file.file.write_all(data)?;
    file.file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    const TEST_FILE: &str = "_test_bookdesk_filelock";
    const TEST_CONTENT: &[u8] = br#"{"token":null,"user":null,"isAuthenticated":false}"#;
    const ITERATIONS: usize = 50;
    const CONCURRENT_TASKS: usize = 20;

    #[tokio::test]
    async fn test_concurrent_file_operations() {
        let _ = fs::remove_file(TEST_FILE);

        let tasks: Vec<_> = (0..CONCURRENT_TASKS)
            .map(|_| {
                tokio::spawn(async {
                    for _ in 0..ITERATIONS {
                        write_file_lock(Path::new(TEST_FILE), TEST_CONTENT)?;
                        let content =
                            read_file_lock(Path::new(TEST_FILE))?.expect("file should exist");
                        assert_eq!(content, TEST_CONTENT);
                    }
                    Ok::<_, anyhow::Error>(())
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        fs::remove_file(TEST_FILE).unwrap();
    }

    #[test]
    fn test_read_nonexistent_file() {
        let result = read_file_lock(Path::new("_nonexistent_bookdesk_file")).unwrap();
        assert!(result.is_none());
    }
}
