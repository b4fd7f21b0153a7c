//! Pull-based wrappers feeding a [`StreamingTracker`]
//!
//! Both adapters yield text fragments as soon as a chunk carries one and
//! pass source errors through unchanged after recording them. Neither
//! finalizes on its own; call `finish` on the tracker when done.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::Stream;
use pin_project_lite::pin_project;

use super::tracker::{FinishedStream, StreamingTracker};
use super::types::Chunk;
use crate::utils::error::Result;

pin_project! {
    /// Async adapter over a fallible chunk stream
    pub struct TrackedStream<S> {
        #[pin]
        inner: S,
        tracker: StreamingTracker,
    }
}

impl<S> TrackedStream<S> {
    pub fn new(inner: S, tracker: StreamingTracker) -> Self {
        Self { inner, tracker }
    }

    pub fn tracker(&self) -> &StreamingTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut StreamingTracker {
        &mut self.tracker
    }

    pub fn into_tracker(self) -> StreamingTracker {
        self.tracker
    }

    pub fn finish(&mut self) -> Result<FinishedStream> {
        self.tracker.finish()
    }
}

impl<S, C, E> Stream for TrackedStream<S>
where
    S: Stream<Item = std::result::Result<C, E>>,
    C: Into<Chunk>,
    E: fmt::Display,
{
    type Item = std::result::Result<String, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => {
                    if let Some(text) = this.tracker.observe(chunk) {
                        return Poll::Ready(Some(Ok(text)));
                    }
                }
                Some(Err(e)) => {
                    this.tracker.record_error(e.to_string());
                    return Poll::Ready(Some(Err(e)));
                }
                None => return Poll::Ready(None),
            }
        }
    }
}

/// Blocking adapter over a fallible chunk iterator
pub struct TrackedIter<I> {
    inner: I,
    tracker: StreamingTracker,
}

impl<I> TrackedIter<I> {
    pub fn new(inner: I, tracker: StreamingTracker) -> Self {
        Self { inner, tracker }
    }

    pub fn tracker(&self) -> &StreamingTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut StreamingTracker {
        &mut self.tracker
    }

    pub fn into_tracker(self) -> StreamingTracker {
        self.tracker
    }

    pub fn finish(&mut self) -> Result<FinishedStream> {
        self.tracker.finish()
    }
}

impl<I, C, E> Iterator for TrackedIter<I>
where
    I: Iterator<Item = std::result::Result<C, E>>,
    C: Into<Chunk>,
    E: fmt::Display,
{
    type Item = std::result::Result<String, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(chunk) => {
                    if let Some(text) = self.tracker.observe(chunk) {
                        return Some(Ok(text));
                    }
                }
                Err(e) => {
                    self.tracker.record_error(e.to_string());
                    return Some(Err(e));
                }
            }
        }
    }
}
