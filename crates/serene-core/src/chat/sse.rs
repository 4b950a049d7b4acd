//! Decoder for the chat endpoint's server-sent-event stream.
//!
//! Each `data:` line carries an OpenAI-style completion chunk; the text
//! lives at `choices[0].delta.content`. A `data: [DONE]` line ends the
//! stream. Reads may split lines, and even UTF-8 sequences, anywhere.

use serde::Deserialize;
use tracing::warn;

const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseItem {
    /// Incremental assistant text.
    Delta(String),
    /// The server signalled the end of the reply.
    Done,
}

#[derive(Deserialize)]
struct Chunk {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// Incremental line decoder. Feed it raw body chunks as they arrive.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// A data line that failed to parse and was put back for one retry.
    retrying: Option<String>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Consume one read from the stream and return what it completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseItem> {
        if self.done {
            return Vec::new();
        }
        self.buffer.extend_from_slice(bytes);
        self.drain_lines()
    }

    /// End of stream. Anything still buffered is treated as a final line.
    pub fn finish(&mut self) -> Vec<SseItem> {
        if self.done {
            return Vec::new();
        }
        if !self.buffer.is_empty() && !self.buffer.ends_with(b"\n") {
            self.buffer.push(b'\n');
        }
        let mut items = self.drain_lines();
        // No more data is coming, so a put-back line gets its second try now.
        while self.retrying.is_some() && !self.buffer.is_empty() && !self.done {
            items.extend(self.drain_lines());
        }
        items
    }

    fn drain_lines(&mut self) -> Vec<SseItem> {
        let mut items = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let mut line = String::from_utf8_lossy(&raw[..raw.len() - 1]).into_owned();
            if line.ends_with('\r') {
                line.pop();
            }
            if line.starts_with(':') || line.trim().is_empty() {
                continue;
            }
            let Some(payload) = line.strip_prefix("data: ") else {
                continue;
            };
            let payload = payload.trim();
            if payload == DONE_SENTINEL {
                self.done = true;
                self.buffer.clear();
                items.push(SseItem::Done);
                break;
            }

            match serde_json::from_str::<Chunk>(payload) {
                Ok(chunk) => {
                    self.retrying = None;
                    if let Some(text) = chunk
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|c| c.delta)
                        .and_then(|d| d.content)
                        .filter(|t| !t.is_empty())
                    {
                        items.push(SseItem::Delta(text));
                    }
                }
                Err(e) if self.retrying.as_deref() != Some(line.as_str()) => {
                    // Put it back and wait for the next read.
                    let mut restored = line.clone().into_bytes();
                    restored.push(b'\n');
                    restored.extend_from_slice(&self.buffer);
                    self.buffer = restored;
                    self.retrying = Some(line);
                    tracing::debug!(error = %e, "incomplete chat chunk, waiting for more data");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, line = %line, "skipping malformed chat chunk");
                    self.retrying = None;
                }
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(content: &str) -> String {
        format!(
            "data: {{\"choices\":[{{\"delta\":{{\"content\":{}}}}}]}}\n",
            serde_json::to_string(content).unwrap()
        )
    }

    fn deltas(items: &[SseItem]) -> String {
        items
            .iter()
            .filter_map(|i| match i {
                SseItem::Delta(t) => Some(t.as_str()),
                SseItem::Done => None,
            })
            .collect()
    }

    #[test]
    fn decodes_deltas_until_done() {
        let mut d = SseDecoder::new();
        let body = format!("{}{}data: [DONE]\n{}", data("Hel"), data("lo"), data("ignored"));
        let items = d.push(body.as_bytes());
        assert_eq!(deltas(&items), "Hello");
        assert_eq!(items.last(), Some(&SseItem::Done));
        assert!(d.is_done());
        assert!(d.push(data("more").as_bytes()).is_empty());
    }

    #[test]
    fn skips_comments_blank_and_foreign_lines() {
        let mut d = SseDecoder::new();
        let body = format!(": keep-alive\n\r\nevent: ping\n{}", data("ok"));
        assert_eq!(deltas(&d.push(body.as_bytes())), "ok");
    }

    #[test]
    fn handles_crlf_and_split_lines() {
        let mut d = SseDecoder::new();
        let line = data("split").replace('\n', "\r\n");
        let (a, b) = line.as_bytes().split_at(10);
        assert!(d.push(a).is_empty());
        assert_eq!(deltas(&d.push(b)), "split");
    }

    #[test]
    fn utf8_split_across_reads() {
        let mut d = SseDecoder::new();
        let line = data("calm 🌿");
        let bytes = line.as_bytes();
        let cut = line.find('🌿').unwrap() + 2;
        assert!(d.push(&bytes[..cut]).is_empty());
        assert_eq!(deltas(&d.push(&bytes[cut..])), "calm 🌿");
    }

    #[test]
    fn unparseable_line_is_retried_once_then_dropped() {
        let mut d = SseDecoder::new();
        let first = d.push(b"data: {\"choices\":[\n");
        assert!(first.is_empty());
        let second = d.push(data("after").as_bytes());
        assert_eq!(deltas(&second), "after");
        assert!(!d.is_done());
    }

    #[test]
    fn chunks_without_content_are_ignored() {
        let mut d = SseDecoder::new();
        let body = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\ndata: {\"choices\":[]}\n";
        assert!(d.push(body.as_bytes()).is_empty());
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut d = SseDecoder::new();
        let line = data("tail");
        d.push(line.trim_end().as_bytes());
        assert_eq!(deltas(&d.finish()), "tail");
    }
}
