//! Minimal RESP2 codec for the session backend.
//!
//! Commands go out as arrays of bulk strings. Replies may be simple strings,
//! errors, integers, bulk strings or flat arrays of those.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::StoreError;

/// Largest bulk string accepted from the wire
const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Simple(String),
    Error(String),
    Integer(i64),
    /// `None` is the null bulk string, sent by `GET` for an absent key
    Bulk(Option<Vec<u8>>),
    Array(Option<Vec<Reply>>),
}

/// Encode one command as a RESP array of bulk strings
pub fn encode_command(args: &[&[u8]]) -> Vec<u8> {
    let mut out = format!("*{}\r\n", args.len()).into_bytes();
    for arg in args {
        out.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
        out.extend_from_slice(arg);
        out.extend_from_slice(b"\r\n");
    }
    out
}

/// Encode a reply; used by the backend side of the protocol
pub fn encode_reply(reply: &Reply) -> Vec<u8> {
    match reply {
        Reply::Simple(s) => format!("+{}\r\n", s).into_bytes(),
        Reply::Error(s) => format!("-{}\r\n", s).into_bytes(),
        Reply::Integer(n) => format!(":{}\r\n", n).into_bytes(),
        Reply::Bulk(None) => b"$-1\r\n".to_vec(),
        Reply::Bulk(Some(data)) => {
            let mut out = format!("${}\r\n", data.len()).into_bytes();
            out.extend_from_slice(data);
            out.extend_from_slice(b"\r\n");
            out
        }
        Reply::Array(None) => b"*-1\r\n".to_vec(),
        Reply::Array(Some(items)) => {
            let mut out = format!("*{}\r\n", items.len()).into_bytes();
            for item in items {
                out.extend_from_slice(&encode_reply(item));
            }
            out
        }
    }
}

pub async fn write_command<W>(writer: &mut W, args: &[&[u8]]) -> Result<(), StoreError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&encode_command(args)).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one reply. Nested arrays are rejected.
pub async fn read_reply<R>(reader: &mut R) -> Result<Reply, StoreError>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_line(reader).await?;
    if let Some(len) = line.strip_prefix('*') {
        let Some(len) = parse_len(len)? else {
            return Ok(Reply::Array(None));
        };
        let mut items = Vec::with_capacity(len.min(64));
        for _ in 0..len {
            let item_line = read_line(reader).await?;
            if item_line.starts_with('*') {
                return Err(StoreError::Protocol("nested arrays are not supported".into()));
            }
            items.push(read_scalar(reader, &item_line).await?);
        }
        return Ok(Reply::Array(Some(items)));
    }
    read_scalar(reader, &line).await
}

async fn read_scalar<R>(reader: &mut R, line: &str) -> Result<Reply, StoreError>
where
    R: AsyncBufRead + Unpin,
{
    let Some(tag) = line.chars().next() else {
        return Err(StoreError::Protocol("empty reply line".into()));
    };
    let rest = &line[tag.len_utf8()..];
    match tag {
        '+' => Ok(Reply::Simple(rest.to_string())),
        '-' => Ok(Reply::Error(rest.to_string())),
        ':' => rest
            .parse()
            .map(Reply::Integer)
            .map_err(|_| StoreError::Protocol(format!("bad integer reply '{}'", rest))),
        '$' => {
            let Some(len) = parse_len(rest)? else {
                return Ok(Reply::Bulk(None));
            };
            if len > MAX_BULK_LEN {
                return Err(StoreError::Protocol(format!("bulk string of {} bytes is too large", len)));
            }
            let mut data = vec![0u8; len + 2];
            reader.read_exact(&mut data).await?;
            if !data.ends_with(b"\r\n") {
                return Err(StoreError::Protocol("bulk string is not CRLF terminated".into()));
            }
            data.truncate(len);
            Ok(Reply::Bulk(Some(data)))
        }
        other => Err(StoreError::Protocol(format!("unknown reply type '{}'", other))),
    }
}

/// Read one CRLF-terminated line without its terminator
async fn read_line<R>(reader: &mut R) -> Result<String, StoreError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = reader.read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "session backend closed the connection",
        )));
    }
    if !buf.ends_with(b"\r\n") {
        return Err(StoreError::Protocol("reply line is not CRLF terminated".into()));
    }
    buf.truncate(buf.len() - 2);
    String::from_utf8(buf).map_err(|_| StoreError::Protocol("reply line is not UTF-8".into()))
}

/// Parse a length header; `-1` means null
fn parse_len(text: &str) -> Result<Option<usize>, StoreError> {
    if text == "-1" {
        return Ok(None);
    }
    text.parse()
        .map(Some)
        .map_err(|_| StoreError::Protocol(format!("bad length '{}'", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn parse(bytes: &[u8]) -> Result<Reply, StoreError> {
        let mut reader = BufReader::new(bytes);
        read_reply(&mut reader).await
    }

    #[test]
    fn set_command_encoding() {
        let bytes = encode_command(&[b"SET".as_slice(), b"s1".as_slice(), b"{}".as_slice()]);
        assert_eq!(bytes, b"*3\r\n$3\r\nSET\r\n$2\r\ns1\r\n$2\r\n{}\r\n");
    }

    #[tokio::test]
    async fn parses_scalar_replies() {
        assert_eq!(parse(b"+PONG\r\n").await.unwrap(), Reply::Simple("PONG".into()));
        assert_eq!(parse(b"-ERR nope\r\n").await.unwrap(), Reply::Error("ERR nope".into()));
        assert_eq!(parse(b":42\r\n").await.unwrap(), Reply::Integer(42));
        assert_eq!(parse(b"$-1\r\n").await.unwrap(), Reply::Bulk(None));
        assert_eq!(parse(b"$0\r\n\r\n").await.unwrap(), Reply::Bulk(Some(Vec::new())));
    }

    #[tokio::test]
    async fn bulk_may_contain_crlf() {
        let reply = parse(b"$4\r\na\r\nb\r\n").await.unwrap();
        assert_eq!(reply, Reply::Bulk(Some(b"a\r\nb".to_vec())));
    }

    #[tokio::test]
    async fn reads_back_an_encoded_command() {
        let bytes = encode_command(&[b"GET".as_slice(), b"s1".as_slice()]);
        let reply = parse(&bytes).await.unwrap();
        assert_eq!(
            reply,
            Reply::Array(Some(vec![
                Reply::Bulk(Some(b"GET".to_vec())),
                Reply::Bulk(Some(b"s1".to_vec())),
            ]))
        );
    }

    #[tokio::test]
    async fn encoded_replies_parse_back() {
        for reply in [
            Reply::Simple("OK".into()),
            Reply::Error("ERR x".into()),
            Reply::Integer(-7),
            Reply::Bulk(None),
            Reply::Bulk(Some(b"payload".to_vec())),
        ] {
            assert_eq!(parse(&encode_reply(&reply)).await.unwrap(), reply);
        }
    }

    #[tokio::test]
    async fn malformed_input_is_protocol_error() {
        assert!(matches!(parse(b"?huh\r\n").await, Err(StoreError::Protocol(_))));
        assert!(matches!(parse(b"+no terminator\n").await, Err(StoreError::Protocol(_))));
        assert!(matches!(parse(b":abc\r\n").await, Err(StoreError::Protocol(_))));
        assert!(matches!(parse(b"*1\r\n*0\r\n").await, Err(StoreError::Protocol(_))));
        assert!(matches!(parse(b"$3\r\nabcd\r\n").await, Err(StoreError::Protocol(_))));
    }

    #[tokio::test]
    async fn eof_is_io_error() {
        assert!(matches!(parse(b"").await, Err(StoreError::Io(_))));
        assert!(matches!(parse(b"$5\r\nab").await, Err(StoreError::Io(_))));
    }
}
