//! Recording fakes for the collaborator ports

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::{
    DiffLine, RecordStore, ReleaseUploader, SkipDrain, Ui, UploadOutcome, UploadRequest,
};

pub struct FakeRecordStore {
    pub name: String,
    pub diff_lines: Vec<DiffLine>,
    pub diff_err: Option<String>,
    pub update_err: Option<String>,
    pub diff_calls: Mutex<Vec<Vec<u8>>>,
    pub update_calls: Mutex<Vec<(Vec<u8>, bool, SkipDrain)>>,
}

impl FakeRecordStore {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            diff_lines: Vec::new(),
            diff_err: None,
            update_err: None,
            diff_calls: Mutex::new(Vec::new()),
            update_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn diff_call_count(&self) -> usize {
        self.diff_calls.lock().unwrap().len()
    }

    pub fn update_call_count(&self) -> usize {
        self.update_calls.lock().unwrap().len()
    }

    pub fn update_args(&self, index: usize) -> (Vec<u8>, bool, SkipDrain) {
        self.update_calls.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl RecordStore for FakeRecordStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn diff(&self, manifest: &[u8]) -> anyhow::Result<Vec<DiffLine>> {
        self.diff_calls.lock().unwrap().push(manifest.to_vec());
        match &self.diff_err {
            Some(err) => Err(anyhow::anyhow!(err.clone())),
            None => Ok(self.diff_lines.clone()),
        }
    }

    async fn update(
        &self,
        manifest: &[u8],
        recreate: bool,
        skip_drain: &SkipDrain,
    ) -> anyhow::Result<()> {
        self.update_calls
            .lock()
            .unwrap()
            .push((manifest.to_vec(), recreate, skip_drain.clone()));
        match &self.update_err {
            Some(err) => Err(anyhow::anyhow!(err.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct FakeUploader {
    /// Zero-based call index that fails
    pub fail_on: Option<usize>,
    /// Zero-based call index that never completes
    pub stall_on: Option<usize>,
    pub present: Vec<String>,
    pub calls: Mutex<Vec<UploadRequest>>,
    /// Notified once the stalled call has started
    pub stalled: Notify,
}

impl FakeUploader {
    pub fn failing_on(index: usize) -> Self {
        Self {
            fail_on: Some(index),
            ..Self::default()
        }
    }

    pub fn stalling_on(index: usize) -> Self {
        Self {
            stall_on: Some(index),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call(&self, index: usize) -> UploadRequest {
        self.calls.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ReleaseUploader for FakeUploader {
    async fn upload(&self, request: &UploadRequest) -> anyhow::Result<UploadOutcome> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len() - 1
        };
        if self.fail_on == Some(index) {
            anyhow::bail!("fake-err");
        }
        if self.stall_on == Some(index) {
            self.stalled.notify_one();
            std::future::pending::<()>().await;
        }
        if self.present.contains(&request.name) {
            return Ok(UploadOutcome::AlreadyPresent);
        }
        Ok(UploadOutcome::Uploaded)
    }
}

#[derive(Default)]
pub struct FakeUi {
    pub said: Mutex<Vec<String>>,
    pub confirmation_err: Option<String>,
    pub confirmations: Mutex<usize>,
}

impl FakeUi {
    pub fn rejecting(reason: &str) -> Self {
        Self {
            confirmation_err: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn said(&self) -> Vec<String> {
        self.said.lock().unwrap().clone()
    }

    pub fn confirmation_count(&self) -> usize {
        *self.confirmations.lock().unwrap()
    }
}

#[async_trait]
impl Ui for FakeUi {
    fn say(&self, line: &str) {
        self.said.lock().unwrap().push(line.to_string());
    }

    async fn ask_for_confirmation(&self) -> anyhow::Result<()> {
        *self.confirmations.lock().unwrap() += 1;
        match &self.confirmation_err {
            Some(err) => Err(anyhow::anyhow!(err.clone())),
            None => Ok(()),
        }
    }
}
