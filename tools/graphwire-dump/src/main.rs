// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! graphwire-dump - Write and decode graphwire object streams
//!
//! `demo` writes a small stream of built-in values; `dump` decodes a stream
//! of built-in values and prints one line per top-level value.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use graphwire::{
    Codec, Error, IoConfig, ObjRef, Object, ObjectArray, ObjectInput, ObjectOutput, Primitive,
    PrimitiveArray,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// First handle assigned in a stream generation.
const FIRST_HANDLE: i32 = 2;
/// Array elements printed before eliding the rest.
const MAX_ELEMENTS: usize = 8;

/// Write and decode graphwire object streams
#[derive(Parser, Debug)]
#[command(name = "graphwire-dump")]
#[command(version = "0.1.0")]
#[command(about = "Write and decode graphwire object streams")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a demonstration stream
    Demo {
        file: PathBuf,

        /// Wire codec
        #[arg(short, long, value_enum, default_value = "native")]
        codec: CodecArg,
    },
    /// Decode a stream of built-in values
    Dump {
        file: PathBuf,

        /// Wire codec
        #[arg(short, long, value_enum, default_value = "native")]
        codec: CodecArg,

        /// Print source offsets and the final handle count
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CodecArg {
    Native,
    Hessian,
}

impl From<CodecArg> for Codec {
    fn from(arg: CodecArg) -> Self {
        match arg {
            CodecArg::Native => Codec::Native,
            CodecArg::Hessian => Codec::Hessian,
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    match &args.command {
        Command::Demo { file, codec } => {
            let config = IoConfig::from_env().with_codec((*codec).into());
            let written = write_demo(file, &config)?;
            eprintln!(
                "{} wrote {} bytes to {} ({})",
                ">>>".green().bold(),
                written,
                file.display(),
                config.codec
            );
        }
        Command::Dump {
            file,
            codec,
            verbose,
        } => {
            let config = IoConfig::from_env().with_codec((*codec).into());
            dump(file, &config, *verbose)?;
        }
    }
    Ok(())
}

// ============================================================================
// demo
// ============================================================================

fn write_demo(path: &Path, config: &IoConfig) -> Result<u64, Box<dyn std::error::Error>> {
    let sink = BufWriter::new(File::create(path)?);
    let mut out = ObjectOutput::with_config(sink, config);

    let greeting = ObjRef::string("hello, graph");
    let answer = ObjRef::int(42);
    let samples = ObjRef::array(PrimitiveArray::Double(
        (0..12).map(|i| f64::from(i) * 0.25).collect(),
    ));
    let names = ObjRef::objects(ObjectArray::new(
        "String",
        vec![Some(greeting.clone()), None, Some(ObjRef::string("tail"))],
    ));

    out.write_object(Some(&greeting))?;
    out.write_object(Some(&answer))?;
    out.write_object(Some(&samples))?;
    out.write_object(Some(&names))?;
    out.write_object(Some(&answer))?;
    out.write_object(Some(&ObjRef::class("String")))?;
    out.write_object(None)?;
    out.write_object(Some(&ObjRef::boxed(Primitive::Char(u16::from(b'g')))))?;
    out.reset(false)?;
    out.write_object(Some(&greeting))?;
    out.flush()?;
    let written = out.bytes_written();
    out.close()?;
    Ok(written)
}

// ============================================================================
// dump
// ============================================================================

/// Handles known to the printer, mirroring the reader's numbering.
#[derive(Default)]
struct Handles {
    by_identity: HashMap<usize, i32>,
}

impl Handles {
    /// New nodes reachable from `object`, in the order the reader numbered them.
    fn collect_new(&self, object: &ObjRef, found: &mut Vec<ObjRef>) {
        let id = object.identity();
        if self.by_identity.contains_key(&id) || found.iter().any(|o| o.identity() == id) {
            return;
        }
        found.push(object.clone());
        if let Object::Objects(array) = &*object.borrow() {
            for element in array.elements.iter().flatten() {
                self.collect_new(element, found);
            }
        }
    }
}

fn dump(path: &Path, config: &IoConfig, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = BufReader::new(File::open(path)?);
    let mut input = ObjectInput::with_config(source, config);
    let mut handles = Handles::default();
    let mut index = 0usize;
    let mut previous_count = 0usize;

    loop {
        let offset = input.bytes_read();
        let value = match input.read_object() {
            Ok(value) => value,
            Err(Error::EndOfStream) => break,
            Err(e) => return Err(e.into()),
        };
        let count = input.handle_count();
        if count < previous_count {
            handles.by_identity.clear();
            println!("{}", "-- reset --".dimmed());
        }
        previous_count = count;

        let line = match &value {
            None => "null".dimmed().to_string(),
            Some(object) => {
                let mut fresh = Vec::new();
                handles.collect_new(object, &mut fresh);
                let mut next = FIRST_HANDLE + count as i32 - fresh.len() as i32;
                for node in &fresh {
                    handles.by_identity.insert(node.identity(), next);
                    next += 1;
                }
                let mut text = String::new();
                render(object, &handles, &fresh, &mut Vec::new(), &mut text);
                text
            }
        };

        if verbose {
            println!(
                "{} {} {}",
                format!("[{}]", index).yellow(),
                format!("@src+{}", offset).dimmed(),
                line
            );
        } else {
            println!("{} {}", format!("[{}]", index).yellow(), line);
        }
        index += 1;
    }

    if verbose {
        println!();
        println!(
            "{} {} value(s), {} bytes, {} live handle(s)",
            "Summary:".cyan().bold(),
            index,
            input.bytes_read(),
            input.handle_count()
        );
    }
    input.close();
    Ok(())
}

/// Render `object`. Nodes read by an earlier value, or already printed in
/// this one, show as `@handle`.
fn render(object: &ObjRef, handles: &Handles, fresh: &[ObjRef], printed: &mut Vec<usize>, text: &mut String) {
    let id = object.identity();
    let handle = handles.by_identity.get(&id).copied();
    if printed.contains(&id) || !fresh.iter().any(|o| o.ptr_eq(object)) {
        match handle {
            Some(h) => text.push_str(&format!("@{}", h).magenta().to_string()),
            None => text.push_str("@?"),
        }
        return;
    }
    printed.push(id);
    if let Some(h) = handle {
        text.push_str(&format!("#{} ", h).dimmed().to_string());
    }

    match &*object.borrow() {
        Object::String(s) => text.push_str(&format!("{:?}", s).green().to_string()),
        Object::Class(name) => text.push_str(&format!("class {}", name.cyan())),
        Object::Boxed(value) => text.push_str(&render_primitive(*value)),
        Object::Array(values) => render_primitive_array(values, text),
        Object::Objects(array) => {
            text.push_str(&format!("{}[{}] {{", array.element_type, array.len()).bold().to_string());
            for (i, element) in array.elements.iter().take(MAX_ELEMENTS).enumerate() {
                text.push_str(if i == 0 { " " } else { ", " });
                match element {
                    None => text.push_str("null"),
                    Some(e) => render(e, handles, fresh, printed, text),
                }
            }
            if array.len() > MAX_ELEMENTS {
                text.push_str(", ...");
            }
            text.push_str(" }");
        }
        Object::Enum(constant) => {
            text.push_str(&format!("{}.{}", constant.type_name, constant.variant));
        }
        other => text.push_str(&other.type_name().red().to_string()),
    }
}

fn render_primitive(value: Primitive) -> String {
    match value {
        Primitive::Boolean(v) => format!("Boolean {}", v),
        Primitive::Byte(v) => format!("Byte {}", v),
        Primitive::Char(v) => match char::from_u32(u32::from(v)) {
            Some(c) => format!("Character {:?}", c),
            None => format!("Character \\u{{{:04x}}}", v),
        },
        Primitive::Short(v) => format!("Short {}", v),
        Primitive::Int(v) => format!("Integer {}", v),
        Primitive::Long(v) => format!("Long {}", v),
        Primitive::Float(v) => format!("Float {}", v),
        Primitive::Double(v) => format!("Double {}", v),
    }
}

fn elided<T: std::fmt::Debug>(values: &[T]) -> String {
    let shown: Vec<String> = values
        .iter()
        .take(MAX_ELEMENTS)
        .map(|v| format!("{:?}", v))
        .collect();
    if values.len() > MAX_ELEMENTS {
        format!("[{}, ...]", shown.join(", "))
    } else {
        format!("[{}]", shown.join(", "))
    }
}

fn render_primitive_array(values: &PrimitiveArray, text: &mut String) {
    let body = match values {
        PrimitiveArray::Boolean(v) => elided(v),
        PrimitiveArray::Byte(v) => elided(v),
        PrimitiveArray::Char(v) => elided(v),
        PrimitiveArray::Short(v) => elided(v),
        PrimitiveArray::Int(v) => elided(v),
        PrimitiveArray::Long(v) => elided(v),
        PrimitiveArray::Float(v) => elided(v),
        PrimitiveArray::Double(v) => elided(v),
    };
    let kind = graphwire::types::names::primitive_name(values.kind());
    text.push_str(&format!("{}[{}] {}", kind.bold(), values.len(), body));
}
