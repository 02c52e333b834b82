//! EmberKV CLI Client
//!
//! Command-line interface for interacting with EmberKV.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;

use clap::Parser;
use emberkv::protocol::{decode, write_value, Frame, Request, Value};

/// EmberKV CLI
#[derive(Parser, Debug)]
#[command(name = "emberkv-cli")]
#[command(about = "CLI for EmberKV key-value server")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    /// Command and arguments, e.g. `SET greeting hello`
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(reply) => {
            print_value(&reply, 0);
            if reply.is_error() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Send one command and read its reply
fn run(args: &Args) -> emberkv::Result<Value> {
    let request = Request::from_words(&args.command)
        .ok_or_else(|| emberkv::EmberError::Config("no command given".to_string()))?;

    let stream = TcpStream::connect(&args.server)?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);

    write_value(&mut writer, &request.into_value())?;

    match decode(&mut reader)? {
        Frame::Value(value) => Ok(value),
        Frame::Eof => Err(emberkv::EmberError::Protocol(
            "server closed the connection without replying".to_string(),
        )),
        Frame::Unsupported(byte) => Err(emberkv::EmberError::Protocol(format!(
            "unexpected reply byte 0x{:02x}",
            byte
        ))),
    }
}

/// Print a reply the way redis-cli does
fn print_value(value: &Value, indent: usize) {
    match value {
        Value::SimpleString(text) => println!("{}", text),
        Value::Error(text) => println!("(error) {}", text),
        Value::Integer(n) => println!("(integer) {}", n),
        Value::BulkString(Some(payload)) => println!("\"{}\"", String::from_utf8_lossy(payload)),
        Value::BulkString(None) | Value::Null => println!("(nil)"),
        Value::Array(items) if items.is_empty() => println!("(empty array)"),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let prefix = format!("{}) ", i + 1);
                if i == 0 {
                    print!("{}", prefix);
                } else {
                    print!("{:width$}{}", "", prefix, width = indent);
                }
                print_value(item, indent + prefix.len());
            }
        }
    }
}
