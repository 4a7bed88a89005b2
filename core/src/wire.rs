//! Raw wire traffic dump written to the client's debug sink.
//!
//! Lines sent to the server are prefixed with `<-`, lines received with
//! `->`, each shown as an escaped string literal.

use std::io::{self, Write};

use crate::http::{HttpRequest, HttpResponse};

pub fn write_request(sink: &mut dyn Write, request: &HttpRequest) -> io::Result<()> {
    writeln!(sink, "<- {:?}", format!("{} {} HTTP/1.1\r\n", request.method, request.url))?;
    for (name, value) in &request.headers {
        writeln!(sink, "<- {:?}", format!("{name}: {value}\r\n"))?;
    }
    writeln!(sink, "<- {:?}", "\r\n")?;
    if let Some(body) = &request.body {
        writeln!(sink, "<- {body:?}")?;
    }
    sink.flush()
}

pub fn write_response(sink: &mut dyn Write, response: &HttpResponse) -> io::Result<()> {
    writeln!(sink, "-> {:?}", format!("HTTP/1.1 {}\r\n", response.status))?;
    for (name, value) in &response.headers {
        writeln!(sink, "-> {:?}", format!("{name}: {value}\r\n"))?;
    }
    writeln!(sink, "-> {:?}", "\r\n")?;
    if !response.body.is_empty() {
        writeln!(sink, "-> {:?}", response.body)?;
    }
    sink.flush()
}
