//! Test fixtures.

use std::io::Write;
use std::net::SocketAddr;
use std::thread::{self, JoinHandle};

use tempfile::NamedTempFile;
use tiny_http::{Header, Response, Server};

/// Five cars, rows 0..4, in the column layout of the public dataset.
pub const FIVE_CARS: &str = "\
make,fuel-type,body-style,drive-wheels,horsepower,highway-mpg
alfa-romero,gas,convertible,rwd,111,27
audi,gas,sedan,fwd,102,30
audi,gas,sedan,4wd,115,22
bmw,gas,sedan,rwd,?,29
volvo,diesel,wagon,rwd,106,26
";

pub fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write fixture");
    file
}

/// Serve `body` once at any path, then stop.
pub fn serve_once(body: &'static str) -> (SocketAddr, JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("bind fixture server");
    let addr = server.server_addr().to_ip().expect("ip listener");
    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let header = Header::from_bytes(&b"Content-Type"[..], &b"text/csv"[..]).expect("header");
            let _ = request.respond(Response::from_string(body).with_header(header));
        }
    });
    (addr, handle)
}
