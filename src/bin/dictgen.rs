//! Builds a dictzip from one or more dictfiles.
//!
//! Grounded in `examples/original_source/cmd/dictgen/main.go`.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process::ExitCode;

use kobo_dictzip::container::Writer as ContainerWriter;
use kobo_dictzip::crypt::parse_crypter_spec;
use kobo_dictzip::dictfile::{parse_dict_file, DictFile};
use kobo_dictzip::pipeline::{write_dictzip, ImagePolicy};
use kobo_dictzip::trie::ExternalMarisaCodec;

fn main() -> ExitCode {
    env_logger::init();

    let matches = clap::Command::new("dictgen")
        .version(clap::crate_version!())
        .about("Builds a Kobo dictzip from one or more dictfiles.")
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("The output filename (will be overwritten if it exists) (- for stdout)")
                .default_value("dicthtml.zip")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("crypt")
                .short('c')
                .long("crypt")
                .help("Encrypt the dictzip using the specified method (format: method:keyhex)")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("remove-footer")
                .long("remove-footer")
                .help("Append a footer-suppression span to every entry, hiding the reader's own end-of-dictionary footer"),
        )
        .arg(
            clap::Arg::new("INPUT")
                .help("Dictfile(s) to build from (- for stdin, usable once)")
                .required(true)
                .multiple_values(true)
                .index(1),
        )
        .get_matches();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(matches: &clap::ArgMatches) -> kobo_dictzip::Result<()> {
    log::info!("parsing dictfiles");
    let mut df = DictFile::new();
    let mut seen_stdin = false;
    for input in matches.values_of("INPUT").unwrap() {
        if input == "-" {
            if seen_stdin {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, "stdin can only be specified once").into());
            }
            seen_stdin = true;
            df.extend(parse_dict_file(io::stdin().lock())?);
        } else {
            df.extend(parse_dict_file(BufReader::new(File::open(input)?))?);
        }
    }

    let encrypter = matches
        .value_of("crypt")
        .map(parse_crypter_spec)
        .transpose()?;

    log::info!("generating dictzip ({} entries)", df.len());
    let output = matches.value_of("output").unwrap();

    // The zip format needs random access to patch in sizes/offsets as
    // entries are finished, so the archive is always built in memory and
    // flushed out afterwards (to a file, or to stdout for "-").
    let mut dw = ContainerWriter::new(io::Cursor::new(Vec::new()));
    if let Some(c) = encrypter {
        dw.set_encrypter(c);
    }
    let remove_footer = matches.is_present("remove-footer");
    write_dictzip(&df, &mut dw, ImagePolicy::None, remove_footer)?;
    let buf = dw.finalize(&ExternalMarisaCodec)?.into_inner();

    if output == "-" {
        io::stdout().write_all(&buf)?;
    } else {
        std::fs::write(output, buf)?;
    }

    eprintln!("Successfully wrote {} entries to {}.", df.len(), output);
    Ok(())
}
