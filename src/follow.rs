//! 跟随模式（tail -f）
//!
//! 打开文件时整体解析一次编码，之后每次轮询只读取新增字节，并用上次生效的编码解码：
//! - 文件变小（日志轮转/截断）时从头开始读取
//! - 没有新内容时返回 `None`
//! - 用户切换编码时重新整体解析

use crate::encoding::{EncodingChoice, EncodingResolver, ResolutionResult, TextEncoding};
use crate::error::{AppError, Result};
use crate::status::EncodingStatus;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 单个文件的跟随会话
#[derive(Debug)]
pub struct FollowSession {
    path: PathBuf,
    resolver: Arc<EncodingResolver>,
    choice: EncodingChoice,
    /// 整体解析得到的编码，从文件开头读取时使用（会处理 BOM）
    encoding: TextEncoding,
    /// 新增内容使用的编码（BOM 编码已固定字节序）
    append_encoding: TextEncoding,
    status: EncodingStatus,
    offset: u64,
}

impl FollowSession {
    /// 打开文件并整体解析，返回会话和首次解析结果
    pub fn open(
        path: impl AsRef<Path>,
        resolver: Arc<EncodingResolver>,
        choice: EncodingChoice,
    ) -> Result<(Self, ResolutionResult)> {
        let mut session = Self {
            path: path.as_ref().to_path_buf(),
            resolver,
            choice,
            encoding: TextEncoding::Utf8,
            append_encoding: TextEncoding::Utf8,
            status: EncodingStatus::NoFile,
            offset: 0,
        };
        let result = session.reload(choice)?;
        Ok((session, result))
    }

    /// 以新的编码选择重新读取整个文件
    pub fn reload(&mut self, choice: EncodingChoice) -> Result<ResolutionResult> {
        let bytes = std::fs::read(&self.path).map_err(|e| self.read_error(e, "Reload"))?;

        let result = self.resolver.resolve(&bytes, choice);
        self.choice = choice;
        self.encoding = result.used_encoding;
        self.append_encoding = result.used_encoding.for_continuation(&bytes);
        self.status = EncodingStatus::from_resolution(&result);
        self.offset = bytes.len() as u64;

        info!(
            file = %self.path.display(),
            choice = %choice,
            used = result.used_encoding.name(),
            detected = result.detected_encoding.map(|d| d.name()),
            bytes = bytes.len(),
            "Loaded file"
        );
        Ok(result)
    }

    /// 读取上次偏移量之后新增的内容
    pub fn poll(&mut self) -> Result<Option<String>> {
        let (buffer, start_offset) = {
            let mut file = File::open(&self.path).map_err(|e| self.read_error(e, "Follow"))?;
            let file_size = file
                .metadata()
                .map_err(|e| self.read_error(e, "Follow"))?
                .len();

            let start_offset = if file_size < self.offset {
                warn!(
                    file = %self.path.display(),
                    previous_offset = self.offset,
                    file_size,
                    "File truncated, reading from beginning"
                );
                0
            } else {
                self.offset
            };

            if start_offset >= file_size {
                self.offset = file_size;
                return Ok(None);
            }

            file.seek(SeekFrom::Start(start_offset))?;
            let mut buffer = Vec::with_capacity((file_size - start_offset) as usize);
            file.read_to_end(&mut buffer)?;
            (buffer, start_offset)
        };

        self.offset = start_offset + buffer.len() as u64;
        if buffer.is_empty() {
            return Ok(None);
        }

        let encoding = if start_offset == 0 {
            self.encoding
        } else {
            self.append_encoding
        };
        let text = encoding.decode_lossy(&buffer);

        debug!(
            file = %self.path.display(),
            encoding = encoding.name(),
            offset_start = start_offset,
            offset_end = self.offset,
            "Read appended content"
        );
        Ok(Some(text))
    }

    fn read_error(&self, error: std::io::Error, context: &str) -> AppError {
        AppError::io_error(
            format!("Failed to read {}: {}", self.path.display(), error),
            Some(self.path.clone()),
        )
        .with_context(context)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn choice(&self) -> EncodingChoice {
        self.choice
    }

    /// 当前生效的编码
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn status(&self) -> EncodingStatus {
        self.status
    }
}
