//! Unpacks a dictzip file into a plain directory for editing.
//!
//! Grounded in `examples/original_source/cmd/dictutil/unpack.go`.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use kobo_dictzip::container::Reader as ContainerReader;
use kobo_dictzip::crypt::parse_crypter_spec;
use kobo_dictzip::fs::unpack;
use kobo_dictzip::trie::ExternalMarisaCodec;

fn main() -> ExitCode {
    env_logger::init();

    let matches = clap::Command::new("dictzip-unpack")
        .version(clap::crate_version!())
        .about("Unpacks a dictzip file into a plain directory")
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("The output directory (must not exist) (default: the basename of the input without the extension)")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("crypt")
                .short('c')
                .long("crypt")
                .help("Decrypt the dictzip (if needed) using the specified method (format: method:keyhex)")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("DICTZIP")
                .help("Path to the dictzip to unpack")
                .required(true)
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
    let input = Path::new(matches.value_of("DICTZIP").unwrap());

    let output: PathBuf = match matches.value_of("output") {
        Some(o) => PathBuf::from(o),
        None => {
            let stem = input.file_stem().unwrap_or(input.as_os_str());
            PathBuf::from(stem)
        }
    };

    let decrypter = matches
        .value_of("crypt")
        .map(parse_crypter_spec)
        .transpose()?;

    eprintln!("Opening input dictzip.");
    let f = File::open(input)?;

    eprintln!("Parsing dictzip.");
    let mut r = ContainerReader::new(f, &ExternalMarisaCodec)?;
    if let Some(c) = decrypter {
        r.set_decrypter(c);
    }

    eprintln!("Unpacking dictzip.");
    unpack(&mut r, &output)?;

    eprintln!("Successfully unpacked dictzip {:?} to dictdir {:?}.", input, output);
    Ok(())
}
