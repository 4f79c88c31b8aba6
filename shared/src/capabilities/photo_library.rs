use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum PhotoLibraryOperation {
    GetPhotos {
        first: u32,
        #[serde(default)]
        after: Option<String>,
    },
}

impl Operation for PhotoLibraryOperation {
    type Output = PhotoLibraryResult;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PhotoPage {
    pub uris: Vec<String>,
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

impl PhotoPage {
    /// Cursor to continue from, if the library has more photos.
    #[must_use]
    pub fn next_cursor(&self) -> Option<String> {
        if self.has_next_page {
            self.end_cursor.clone()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum PhotoLibraryError {
    #[error("photo library permission denied")]
    PermissionDenied,

    #[error("photo library unavailable on this platform")]
    Unavailable,

    #[error("photo library error: {message}")]
    Platform { message: String },
}

pub type PhotoLibraryResult = Result<PhotoPage, PhotoLibraryError>;

pub struct PhotoLibrary<E> {
    context: CapabilityContext<PhotoLibraryOperation, E>,
}

impl<Ev> Capability<Ev> for PhotoLibrary<Ev> {
    type Operation = PhotoLibraryOperation;
    type MappedSelf<MappedEv> = PhotoLibrary<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        PhotoLibrary::new(self.context.map_event(f))
    }
}

impl<E> PhotoLibrary<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<PhotoLibraryOperation, E>) -> Self {
        Self { context }
    }

    pub fn get_photos<F>(&self, first: u32, after: Option<String>, callback: F)
    where
        F: FnOnce(PhotoLibraryResult) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(PhotoLibraryOperation::GetPhotos { first, after })
                .await;
            context.update_app(callback(result));
        });
    }
}
