//! HTTP/1.0-style response framing.
//!
//! # Responsibilities
//! - Frame status line + blank line + body back to the client
//! - Relay upstream status/reason/body verbatim on upstream failure
//!
//! # Design Decisions
//! - No Content-Length, no keep-alive, no chunked encoding; the body is
//!   terminated by closing the connection
//! - The unknown-mirror listing and the malformed-request reply both carry
//!   explicit status lines (the reference implementation omitted them)

use tokio::io::{AsyncWrite, AsyncWriteExt};

pub const CRLF: &str = "\r\n";

/// Write the success status line and the blank line that ends the headers.
/// The caller streams the body afterwards.
pub async fn write_success_header<W>(writer: &mut W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(b"HTTP/1.0 200 OK\r\n\r\n").await
}

/// Write a complete success response.
pub async fn write_success<W>(writer: &mut W, body: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    write_success_header(writer).await?;
    writer.write_all(body).await?;
    writer.flush().await
}

/// Relay an upstream failure: the upstream's own status code, reason phrase,
/// and body, passed through unchanged.
pub async fn write_upstream_failure<W>(
    writer: &mut W,
    status: u16,
    reason: &str,
    body: &[u8],
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let head = format!("HTTP/1.0 {} {}{}{}", status, reason, CRLF, CRLF);
    writer.write_all(head.as_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await
}

/// Reply to a request line that could not be parsed.
pub async fn write_bad_request<W>(writer: &mut W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(b"HTTP/1.0 400 Bad Request\r\n\r\n")
        .await?;
    writer.flush().await
}

/// Reply when a cache read or write failed mid-request.
pub async fn write_server_error<W>(writer: &mut W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(b"HTTP/1.0 500 Internal Server Error\r\n\r\n")
        .await?;
    writer.flush().await
}
