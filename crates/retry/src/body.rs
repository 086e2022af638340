//! Request and response bodies, and the replayable wrapper used between
//! retry attempts.
//!
//! A [`Body`] is read once. It may carry a [`Rewinder`] that produces a
//! fresh copy of the same bytes; bodies built from in-memory bytes get one
//! automatically. [`ReplayableBody`] hands out observed copies of a body to
//! successive attempts and only rewinds when the previous attempt actually
//! touched it.

use std::{
    fmt, io,
    pin::Pin,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    task::{Context, Poll},
};

use {
    bytes::Bytes,
    tokio::io::{AsyncRead, AsyncReadExt, ReadBuf},
};

use crate::error::RewindError;

/// Produces a fresh body with the same content.
pub type Rewinder = Arc<dyn Fn() -> io::Result<Body> + Send + Sync>;

enum Inner {
    Empty,
    Full(Bytes),
    Reader(Pin<Box<dyn AsyncRead + Send>>),
}

pub struct Body {
    inner: Inner,
    content_length: Option<u64>,
    rewinder: Option<Rewinder>,
}

impl Body {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: Inner::Empty,
            content_length: Some(0),
            rewinder: None,
        }
    }

    /// A streaming body. `content_length` is `None` when unknown. The body
    /// cannot be replayed unless a rewinder is attached.
    pub fn from_reader(
        reader: impl AsyncRead + Send + 'static,
        content_length: Option<u64>,
    ) -> Self {
        Self {
            inner: Inner::Reader(Box::pin(reader)),
            content_length,
            rewinder: None,
        }
    }

    #[must_use]
    pub fn with_rewinder(mut self, rewinder: Rewinder) -> Self {
        self.rewinder = Some(rewinder);
        self
    }

    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    #[must_use]
    pub fn rewinder(&self) -> Option<&Rewinder> {
        self.rewinder.as_ref()
    }

    /// Known to carry no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.inner {
            Inner::Empty => true,
            Inner::Full(bytes) => bytes.is_empty(),
            Inner::Reader(_) => self.content_length == Some(0),
        }
    }

    /// Read the remaining content into memory.
    pub async fn collect(self) -> io::Result<Bytes> {
        match self.inner {
            Inner::Empty => Ok(Bytes::new()),
            Inner::Full(bytes) => Ok(bytes),
            Inner::Reader(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).await?;
                Ok(buf.into())
            },
        }
    }

    /// Like [`Body::collect`], but fails with `InvalidData` instead of
    /// reading more than `limit` bytes.
    pub async fn collect_at_most(self, limit: u64) -> io::Result<Bytes> {
        if let Inner::Full(bytes) = &self.inner
            && bytes.len() as u64 <= limit
        {
            return Ok(bytes.clone());
        }
        let mut buf = Vec::new();
        self.take(limit.saturating_add(1))
            .read_to_end(&mut buf)
            .await?;
        if buf.len() as u64 > limit {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("body is longer than {limit} bytes"),
            ));
        }
        Ok(buf.into())
    }

    fn take_rewinder(&mut self) -> Option<Rewinder> {
        self.rewinder.take()
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        let copy = bytes.clone();
        Self {
            content_length: Some(bytes.len() as u64),
            inner: Inner::Full(bytes),
            rewinder: Some(Arc::new(move || Ok(Body::from(copy.clone())))),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Bytes::from(s).into()
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Bytes::from_static(s.as_bytes()).into()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.inner {
            Inner::Empty => "empty",
            Inner::Full(_) => "full",
            Inner::Reader(_) => "reader",
        };
        f.debug_struct("Body")
            .field("kind", &kind)
            .field("content_length", &self.content_length)
            .field("rewindable", &self.rewinder.is_some())
            .finish()
    }
}

impl AsyncRead for Body {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match &mut this.inner {
            Inner::Empty => Poll::Ready(Ok(())),
            Inner::Full(bytes) => {
                let n = bytes.len().min(buf.remaining());
                buf.put_slice(&bytes.split_to(n));
                Poll::Ready(Ok(()))
            },
            Inner::Reader(reader) => reader.as_mut().poll_read(cx, buf),
        }
    }
}

struct Shared {
    source: Mutex<Body>,
    did_read: AtomicBool,
    did_close: AtomicBool,
}

/// Read side handed to one attempt. Reading sets `did_read`, dropping sets
/// `did_close`.
struct Observed(Arc<Shared>);

impl AsyncRead for Observed {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.0.did_read.store(true, Ordering::Release);
        let mut source = self.0.source.lock().unwrap_or_else(PoisonError::into_inner);
        Pin::new(&mut *source).poll_read(cx, buf)
    }
}

impl Drop for Observed {
    fn drop(&mut self) {
        self.0.did_close.store(true, Ordering::Release);
    }
}

/// A request body that can be offered to several attempts in turn.
pub struct ReplayableBody {
    shared: Arc<Shared>,
    content_length: Option<u64>,
    rewinder: Option<Rewinder>,
}

impl ReplayableBody {
    pub fn new(mut body: Body) -> Self {
        let rewinder = body.take_rewinder();
        let content_length = body.content_length();
        Self {
            shared: Self::share(body),
            content_length,
            rewinder,
        }
    }

    fn share(body: Body) -> Arc<Shared> {
        Arc::new(Shared {
            source: Mutex::new(body),
            did_read: AtomicBool::new(false),
            did_close: AtomicBool::new(false),
        })
    }

    /// Body for the next attempt. Reads are served from the current source.
    #[must_use]
    pub fn body(&self) -> Body {
        Body::from_reader(Observed(Arc::clone(&self.shared)), self.content_length)
    }

    #[must_use]
    pub fn did_read(&self) -> bool {
        self.shared.did_read.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn did_close(&self) -> bool {
        self.shared.did_close.load(Ordering::Acquire)
    }

    /// Restore the body to its start. A body nobody read or closed since the
    /// last rewind is left as is.
    pub fn rewind(&mut self) -> Result<(), RewindError> {
        if !self.did_read() && !self.did_close() {
            return Ok(());
        }
        let rewinder = self.rewinder.as_ref().ok_or(RewindError::NoRewinder)?;
        let mut fresh = rewinder()?;
        fresh.take_rewinder();
        self.shared = Self::share(fresh);
        Ok(())
    }
}

impl fmt::Debug for ReplayableBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplayableBody")
            .field("content_length", &self.content_length)
            .field("did_read", &self.did_read())
            .field("did_close", &self.did_close())
            .field("rewindable", &self.rewinder.is_some())
            .finish()
    }
}
