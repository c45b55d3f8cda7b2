use crate::args::{Kind, unescape};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use linkframe_core::{FrameConfig, MessageType};
use linkframe_protocol::{Diagnosis, FrameCodec, FrameLengths, ValidationStatus, ascii::pretty};
use serde::Serialize;
use std::io::Write;
use tracing::{debug, info};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a frame around a payload.
    Encode(EncodeArgs),
    /// Validate a candidate frame and show every check.
    Decode(DecodeArgs),
    /// Escape bytes so they can travel as a frame payload.
    Embed(BytesArgs),
    /// Undo `embed`.
    Extract(BytesArgs),
    /// Explain a serialized validation status.
    Status(StatusArgs),
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Payload; accepts \t \r \n \\ \xHH escapes.
    pub payload: String,

    #[arg(long, value_enum, default_value_t = Kind::Send)]
    pub kind: Kind,

    /// Escape the payload before framing it.
    #[arg(long)]
    pub embed: bool,

    /// Write the wire bytes to stdout unmodified.
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Candidate frame; accepts \t \r \n \\ \xHH escapes.
    pub frame: String,
}

#[derive(Args, Debug)]
pub struct BytesArgs {
    /// Input; accepts \t \r \n \\ \xHH escapes.
    pub input: String,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Serialized status, e.g. "25,4,4,5,8;T,T,T,T,T,T,T,T,T,F".
    pub status: String,
}

#[derive(Serialize)]
struct EncodeOutput {
    kind: MessageType,
    length: u32,
    checksum: String,
    frame: String,
}

#[derive(Serialize)]
struct DecodeOutput<'a> {
    valid: bool,
    diagnosis: Diagnosis,
    lengths: FrameLengths,
    serialized: String,
    status: &'a ValidationStatus,
    kind: Option<MessageType>,
    payload: Option<String>,
}

#[derive(Serialize)]
struct BytesOutput {
    len: usize,
    text: String,
}

/// Run one command. `Ok(false)` means the input was processed but did not
/// validate.
pub fn run(command: Command, config: FrameConfig, json: bool) -> Result<bool> {
    let mut codec = FrameCodec::new(config).context("frame configuration")?;

    match command {
        Command::Encode(args) => encode(&mut codec, args, json),
        Command::Decode(args) => decode(&mut codec, args, json),
        Command::Embed(args) => {
            let output = codec.embed(&unescape(&args.input)?);
            print_bytes(&output, json)
        }
        Command::Extract(args) => {
            let output = codec.extract(&unescape(&args.input)?);
            print_bytes(&output, json)
        }
        Command::Status(args) => status(&args.status, json),
    }
}

fn encode(codec: &mut FrameCodec, args: EncodeArgs, json: bool) -> Result<bool> {
    let mut payload = unescape(&args.payload)?;
    if args.embed {
        payload = codec.embed(&payload);
    }
    let max = codec.config().max_payload_len();
    if payload.len() > max {
        anyhow::bail!("payload of {} bytes exceeds the {max} byte limit", payload.len());
    }

    let wire = codec.generate(&payload, args.kind.into()).to_vec();
    info!(frame = %codec.frame(), "encoded");

    if args.raw {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&wire)?;
        stdout.flush()?;
    } else if json {
        print_json(&EncodeOutput {
            kind: codec.kind(),
            length: codec.length().value(),
            checksum: codec.checksum().text().to_string(),
            frame: pretty(&wire),
        })?;
    } else {
        println!("{}", pretty(&wire));
    }
    Ok(true)
}

fn decode(codec: &mut FrameCodec, args: DecodeArgs, json: bool) -> Result<bool> {
    let candidate = unescape(&args.frame)?;
    debug!(candidate = %pretty(&candidate), "decoding");

    let status = codec.parse(&candidate);
    let valid = status.is_valid();

    if json {
        print_json(&DecodeOutput {
            valid,
            diagnosis: status.classify(),
            lengths: status.lengths(),
            serialized: status.serialize(),
            status: &status,
            kind: valid.then(|| codec.kind()),
            payload: valid.then(|| pretty(codec.payload())),
        })?;
    } else {
        print!("{status}");
        println!("{:.<18}>  {:?}", "diagnosis", status.classify());
        if valid {
            println!("{}", codec.frame());
        }
    }

    Ok(valid)
}

fn status(text: &str, json: bool) -> Result<bool> {
    let status: ValidationStatus = text.parse().context("decoding status")?;
    if json {
        print_json(&status)?;
    } else {
        print!("{status}");
        println!("{:.<18}>  {:?}", "diagnosis", status.classify());
    }
    Ok(true)
}

fn print_bytes(bytes: &[u8], json: bool) -> Result<bool> {
    if json {
        print_json(&BytesOutput {
            len: bytes.len(),
            text: pretty(bytes),
        })?;
    } else {
        println!("{}", pretty(bytes));
    }
    Ok(true)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
