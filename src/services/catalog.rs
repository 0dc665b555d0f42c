//! Catalog export service
//!
//! The export is written to a temp file first so the database cursor is
//! released before the download starts. The file is removed once the
//! download stream is dropped.

use std::{io, path::PathBuf};

use tempfile::{Builder, TempPath};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt, BufWriter},
};
use tokio_stream::{Stream, StreamExt};

use crate::{error::AppResult, repository::Repository};

/// File name offered to the client
pub const CATALOG_FILE_NAME: &str = "catalog.csv";

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Clone)]
pub struct CatalogExporter {
    repository: Repository,
    temp_dir: Option<PathBuf>,
}

/// A finished export waiting on disk to be streamed
#[derive(Debug)]
pub struct CatalogFile {
    path: TempPath,
    len: u64,
    lines: u64,
}

impl CatalogExporter {
    pub fn new(repository: Repository, temp_dir: Option<PathBuf>) -> Self {
        Self {
            repository,
            temp_dir,
        }
    }

    /// Write one `"<title>, <price>"` line per book into a fresh temp file.
    pub async fn export(&self) -> AppResult<CatalogFile> {
        let mut builder = Builder::new();
        builder.prefix("catalog").suffix(".csv");
        let temp = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let (file, path) = temp.into_parts();

        let mut writer = BufWriter::new(File::from_std(file));
        let mut lines = 0u64;

        let rows = self.repository.books.stream_catalog();
        tokio::pin!(rows);
        while let Some(entry) = rows.next().await {
            let entry = entry?;
            writer.write_all(entry.to_line().as_bytes()).await?;
            writer.write_all(b"\n").await?;
            lines += 1;
        }
        writer.flush().await?;

        let len = writer.into_inner().metadata().await?.len();
        tracing::debug!("Catalog export wrote {} lines ({} bytes) to {}", lines, len, path.display());

        Ok(CatalogFile { path, len, lines })
    }
}

impl CatalogFile {
    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Size in bytes
    pub(crate) fn len(&self) -> u64 {
        self.len
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of books written
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Stream the file in chunks. The temp file lives as long as the stream.
    pub async fn into_stream(
        self,
    ) -> AppResult<impl Stream<Item = io::Result<Vec<u8>>> + Send + 'static> {
        let file = File::open(&self.path).await?;
        let reader = CatalogReader {
            file,
            _path: self.path,
        };
        Ok(futures_util::stream::try_unfold(reader, next_chunk))
    }
}

struct CatalogReader {
    file: File,
    _path: TempPath,
}

async fn next_chunk(mut reader: CatalogReader) -> io::Result<Option<(Vec<u8>, CatalogReader)>> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let n = reader.file.read(&mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    buf.truncate(n);
    Ok(Some((buf, reader)))
}
