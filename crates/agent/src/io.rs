use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Source of user utterances. `Ok(None)` means the input has ended.
pub trait InputSource {
    fn read(&mut self) -> io::Result<Option<String>>;
}

impl<S: InputSource + ?Sized> InputSource for &mut S {
    fn read(&mut self) -> io::Result<Option<String>> {
        (**self).read()
    }
}

/// Destination for system utterances.
pub trait OutputSink {
    fn write(&mut self, utterance: &str) -> io::Result<()>;
}

/// Reads one utterance per line.
#[derive(Debug)]
pub struct LineSource<R> {
    reader: R,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> InputSource for LineSource<R> {
    fn read(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

/// Replays a fixed list of utterances, then reports end of input.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    utterances: VecDeque<String>,
}

impl ScriptedSource {
    pub fn new<I, S>(utterances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { utterances: utterances.into_iter().map(Into::into).collect() }
    }

    pub fn remaining(&self) -> usize {
        self.utterances.len()
    }
}

impl InputSource for ScriptedSource {
    fn read(&mut self) -> io::Result<Option<String>> {
        Ok(self.utterances.pop_front())
    }
}

/// Wraps a source so the next utterance can be inspected without consuming
/// it. Used to tell whether another session has any input before opening it.
#[derive(Debug)]
pub struct PeekableSource<S> {
    inner: S,
    peeked: Option<Option<String>>,
}

impl<S: InputSource> PeekableSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, peeked: None }
    }

    /// Returns the next utterance, reading it from the inner source at most
    /// once. `Ok(None)` means the input has ended.
    pub fn peek(&mut self) -> io::Result<Option<&str>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.inner.read()?);
        }
        Ok(self.peeked.as_ref().and_then(|line| line.as_deref()))
    }
}

impl<S: InputSource> InputSource for PeekableSource<S> {
    fn read(&mut self) -> io::Result<Option<String>> {
        match self.peeked.take() {
            Some(line) => Ok(line),
            None => self.inner.read(),
        }
    }
}

/// Writes each utterance on its own line and flushes.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn write(&mut self, utterance: &str) -> io::Result<()> {
        writeln!(self.writer, "{utterance}")?;
        self.writer.flush()
    }
}

/// Keeps every system utterance in memory.
#[derive(Clone, Debug, Default)]
pub struct TranscriptSink {
    utterances: Vec<String>,
}

impl TranscriptSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn utterances(&self) -> &[String] {
        &self.utterances
    }

    pub fn into_utterances(self) -> Vec<String> {
        self.utterances
    }
}

impl OutputSink for TranscriptSink {
    fn write(&mut self, utterance: &str) -> io::Result<()> {
        self.utterances.push(utterance.to_string());
        Ok(())
    }
}
