use chrono::{DateTime, Local};
use std::io::{self, Read, Seek, SeekFrom};
use tracing::{error, info};

use crate::errors::UploaderError;
use crate::models::uploads::entities::FileAttachment;
use crate::models::uploads::responses::{FailedAttachment, FailureStage, PersistedFile};
use crate::storage::LocalStorage;
use crate::utils::{md5_hex, output_file_name};

/// 将单个附件写入输出目录
///
/// 流程：打开 → 计算 MD5 → 复位 → 生成文件名 → 独占创建 → 写入。
/// 任一步骤失败都只放弃当前附件。
pub fn persist_attachment(
    storage: &LocalStorage,
    attachment: &FileAttachment,
) -> Result<PersistedFile, FailedAttachment> {
    persist_attachment_with_clock(storage, attachment, Local::now)
}

pub(crate) fn persist_attachment_with_clock<F>(
    storage: &LocalStorage,
    attachment: &FileAttachment,
    clock: F,
) -> Result<PersistedFile, FailedAttachment>
where
    F: FnOnce() -> DateTime<Local>,
{
    let reader = attachment.open().map_err(|e| {
        failure(
            &attachment.field_name,
            &attachment.file_name,
            FailureStage::Open,
            e.into(),
        )
    })?;

    persist_source(
        storage,
        &attachment.field_name,
        &attachment.file_name,
        reader,
        clock,
    )
}

/// 从已打开的读取句柄开始的写入流程：MD5 → 复位 → 独占创建 → 写入
pub(crate) fn persist_source<R, F>(
    storage: &LocalStorage,
    field_name: &str,
    original_name: &str,
    mut reader: R,
    clock: F,
) -> Result<PersistedFile, FailedAttachment>
where
    R: Read + Seek,
    F: FnOnce() -> DateTime<Local>,
{
    let fail = |stage: FailureStage, err: UploaderError| {
        failure(field_name, original_name, stage, err)
    };

    let checksum = md5_hex(&mut reader).map_err(|e| fail(FailureStage::Checksum, e.into()))?;

    reader
        .seek(SeekFrom::Start(0))
        .map_err(|e| fail(FailureStage::Rewind, e.into()))?;

    let captured_at = clock();
    let file_name = output_file_name(&captured_at, &checksum, original_name);
    let (path, mut output) = storage
        .create_new(&file_name)
        .map_err(|e| fail(FailureStage::Create, e))?;

    // 写入失败时保留已创建的文件，不做清理
    let size = io::copy(&mut reader, &mut output).map_err(|e| fail(FailureStage::Write, e.into()))?;

    info!("Stored '{}' ({} bytes)", path.display(), size);

    Ok(PersistedFile {
        field_name: field_name.to_string(),
        file_name,
        path,
        checksum,
        size,
        captured_at,
    })
}

fn failure(
    field_name: &str,
    original_name: &str,
    stage: FailureStage,
    err: UploaderError,
) -> FailedAttachment {
    error!(
        "Failed to persist '{}' from field '{}' at {} stage: {}",
        original_name, field_name, stage, err
    );
    FailedAttachment::new(field_name, original_name, stage, &err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::uploads::entities::AttachmentBody;
    use chrono::TimeZone;
    use std::io::Cursor;
    use tempfile::{NamedTempFile, tempdir};

    fn attachment(name: &str, data: &[u8]) -> FileAttachment {
        FileAttachment {
            field_name: "file".to_string(),
            file_name: name.to_string(),
            content_type: None,
            size: data.len() as u64,
            body: AttachmentBody::Memory(data.to_vec()),
        }
    }

    fn fixed_clock() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_persist_writes_content_under_template_name() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let stored =
            persist_attachment_with_clock(&storage, &attachment("hello.txt", b"hello world"), fixed_clock)
                .unwrap();

        let expected = output_file_name(&fixed_clock(), "5eb63bbbe01eeed093cb22bb8f5acdc3", "hello.txt");
        assert_eq!(stored.file_name, expected);
        assert_eq!(stored.path, dir.path().join(&expected));
        assert_eq!(stored.size, 11);
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"hello world");
    }

    #[test]
    fn test_collision_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        let upload = attachment("same.txt", b"same bytes");

        let first = persist_attachment_with_clock(&storage, &upload, fixed_clock).unwrap();
        let second = persist_attachment_with_clock(&storage, &upload, fixed_clock).unwrap_err();

        assert_eq!(second.stage, FailureStage::Create);
        assert_eq!(second.code, "E006");
        assert_eq!(std::fs::read(&first.path).unwrap(), b"same bytes");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_output_dir_fails_at_create() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("does-not-exist"));

        let failed = persist_attachment(&storage, &attachment("a.txt", b"a")).unwrap_err();
        assert_eq!(failed.stage, FailureStage::Create);
        assert_eq!(failed.file_name, "a.txt");
        assert!(!dir.path().join("does-not-exist").exists());
    }

    /// 按阶段注入故障的读取源
    struct FaultyReader {
        inner: Cursor<Vec<u8>>,
        fail_on: FailureStage,
        rewound: bool,
    }

    impl FaultyReader {
        fn new(data: &[u8], fail_on: FailureStage) -> Self {
            Self {
                inner: Cursor::new(data.to_vec()),
                fail_on,
                rewound: false,
            }
        }
    }

    impl Read for FaultyReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let failing = match self.fail_on {
                FailureStage::Checksum => !self.rewound,
                FailureStage::Write => self.rewound,
                _ => false,
            };
            if failing {
                return Err(io::Error::other("read interrupted"));
            }
            self.inner.read(buf)
        }
    }

    impl Seek for FaultyReader {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            if self.fail_on == FailureStage::Rewind {
                return Err(io::Error::other("seek unsupported"));
            }
            self.rewound = true;
            self.inner.seek(pos)
        }
    }

    fn persist_faulty(storage: &LocalStorage, fail_on: FailureStage) -> FailedAttachment {
        persist_source(
            storage,
            "file",
            "broken.bin",
            FaultyReader::new(b"payload", fail_on),
            fixed_clock,
        )
        .unwrap_err()
    }

    #[test]
    fn test_checksum_failure_creates_nothing() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let failed = persist_faulty(&storage, FailureStage::Checksum);
        assert_eq!(failed.stage, FailureStage::Checksum);
        assert_eq!(failed.code, "E005");
        assert_eq!(failed.file_name, "broken.bin");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_rewind_failure_creates_nothing() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let failed = persist_faulty(&storage, FailureStage::Rewind);
        assert_eq!(failed.stage, FailureStage::Rewind);
        assert!(failed.error.contains("seek unsupported"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_failure_is_recorded_and_partial_file_kept() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let failed = persist_faulty(&storage, FailureStage::Write);
        assert_eq!(failed.stage, FailureStage::Write);
        assert!(failed.error.contains("read interrupted"));

        // 目标文件已独占创建，写入失败后保留原样
        let checksum = md5_hex(&mut Cursor::new(b"payload")).unwrap();
        let expected = dir
            .path()
            .join(output_file_name(&fixed_clock(), &checksum, "broken.bin"));
        assert!(expected.exists());
        assert!(std::fs::read(expected).unwrap().is_empty());
    }

    #[test]
    fn test_removed_spill_file_fails_at_open() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let spilled = NamedTempFile::new().unwrap();
        std::fs::remove_file(spilled.path()).unwrap();
        let upload = FileAttachment {
            field_name: "file".to_string(),
            file_name: "gone.bin".to_string(),
            content_type: None,
            size: 0,
            body: AttachmentBody::Spilled(spilled),
        };

        let failed = persist_attachment(&storage, &upload).unwrap_err();
        assert_eq!(failed.stage, FailureStage::Open);
        assert_eq!(failed.file_name, "gone.bin");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_file_is_persisted() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let stored = persist_attachment(&storage, &attachment("empty", b"")).unwrap();
        assert!(stored.file_name.contains(" d41d8cd98f00b204e9800998ecf8427e empty"));
        assert_eq!(stored.size, 0);
        assert!(std::fs::read(&stored.path).unwrap().is_empty());
    }
}
