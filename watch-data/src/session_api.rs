//! The remote session API seen by the controller.
//!
//! Every method returns a boxed `'static` future so poll loops can move a
//! clone of the client into a spawned task.

use futures::future::BoxFuture;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{Detection, ModelsInfo, UploadReceipt};

pub type ApiFuture<T> = BoxFuture<'static, Result<T>>;

/// Commands and reads exposed by the detection service.
pub trait SessionApi: Send + Sync + 'static {
    /// `POST /camera/start {source}`
    fn start(&self, source: &str) -> ApiFuture<()>;

    /// `POST /camera/stop`, best-effort on the remote side
    fn stop(&self) -> ApiFuture<()>;

    /// `POST /models/switch {model}`
    fn switch_model(&self, model: &str) -> ApiFuture<()>;

    /// `GET /models`
    fn list_models(&self) -> ApiFuture<ModelsInfo>;

    /// `GET /camera/detections`
    fn detections(&self) -> ApiFuture<Vec<Detection>>;

    /// `GET /camera/snapshot`, raw encoded image bytes
    fn snapshot(&self) -> ApiFuture<Vec<u8>>;

    /// `POST /compression/upload` (multipart field `file`)
    fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ApiFuture<UploadReceipt>;

    /// `POST /sugar-count/reset`
    fn reset_bag_count(&self) -> ApiFuture<()>;
}

impl<T: SessionApi + ?Sized> SessionApi for Arc<T> {
    fn start(&self, source: &str) -> ApiFuture<()> {
        (**self).start(source)
    }

    fn stop(&self) -> ApiFuture<()> {
        (**self).stop()
    }

    fn switch_model(&self, model: &str) -> ApiFuture<()> {
        (**self).switch_model(model)
    }

    fn list_models(&self) -> ApiFuture<ModelsInfo> {
        (**self).list_models()
    }

    fn detections(&self) -> ApiFuture<Vec<Detection>> {
        (**self).detections()
    }

    fn snapshot(&self) -> ApiFuture<Vec<u8>> {
        (**self).snapshot()
    }

    fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ApiFuture<UploadReceipt> {
        (**self).upload(file_name, bytes)
    }

    fn reset_bag_count(&self) -> ApiFuture<()> {
        (**self).reset_bag_count()
    }
}
