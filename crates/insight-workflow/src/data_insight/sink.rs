use super::client::MetadataApi;
use super::entity::ReportData;
use crate::status::StepStatus;
use insight_error::ExecutionError;
use log::{debug, info};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

pub trait ReportSink {
    fn name(&self) -> &'static str;

    /// Acquire whatever the sink writes to. Failing here aborts the run.
    fn prepare(&mut self) -> Result<(), ExecutionError> {
        Ok(())
    }

    fn write(&mut self, record: &ReportData) -> anyhow::Result<()>;

    fn close(&mut self) -> anyhow::Result<()>;
}

/// Writes one JSON object per line.
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path, writer: None }
    }
}

impl ReportSink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    fn prepare(&mut self) -> Result<(), ExecutionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        self.writer = Some(BufWriter::new(file));
        debug!("File sink opened at {}", self.path.display());
        Ok(())
    }

    fn write(&mut self, record: &ReportData) -> anyhow::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("file sink not prepared"))?;
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            info!("📝 Report data written to {}", self.path.display());
        }
        Ok(())
    }
}

/// Posts report data back to the OpenMetadata server.
pub struct MetadataRestSink {
    api: Arc<dyn MetadataApi>,
}

impl MetadataRestSink {
    pub fn new(api: Arc<dyn MetadataApi>) -> Self {
        Self { api }
    }
}

impl ReportSink for MetadataRestSink {
    fn name(&self) -> &'static str {
        "metadata-rest"
    }

    fn write(&mut self, record: &ReportData) -> anyhow::Result<()> {
        self.api.post_report_data(record)
    }

    fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Write every record, recording per-record outcomes in `status`.
pub fn write_all(sink: &mut dyn ReportSink, records: &[ReportData], status: &mut StepStatus) {
    for record in records {
        match sink.write(record) {
            Ok(()) => status.scanned(record.label()),
            Err(e) => status.failed(record.label(), format!("{e:#}")),
        }
    }
}
