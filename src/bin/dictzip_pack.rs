//! Packs an unpacked dictzip directory (as produced by `dictzip-unpack`)
//! back into a dictzip file.
//!
//! Grounded in `examples/original_source/cmd/dictutil/pack.go`.

use std::path::Path;
use std::process::ExitCode;

use kobo_dictzip::container::Writer as ContainerWriter;
use kobo_dictzip::crypt::parse_crypter_spec;
use kobo_dictzip::fs::pack;
use kobo_dictzip::trie::ExternalMarisaCodec;

fn main() -> ExitCode {
    env_logger::init();

    let matches = clap::Command::new("dictzip-pack")
        .version(clap::crate_version!())
        .about("Packs an unpacked dictzip directory into a dictzip file")
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("The output dictzip filename (will be overwritten if it exists)")
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
            clap::Arg::new("DICTDIR")
                .help("Path to the unpacked dictzip directory")
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
    let input = Path::new(matches.value_of("DICTDIR").unwrap());
    let output = Path::new(matches.value_of("output").unwrap());

    if !input.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("input {:?} is not a dir", input),
        )
        .into());
    }

    let encrypter = matches
        .value_of("crypt")
        .map(parse_crypter_spec)
        .transpose()?;

    eprintln!("Creating output temp file.");
    let out_dir = output.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix("tmp_dicthtml.")
        .suffix(".zip")
        .tempfile_in(out_dir)?;

    eprintln!("Packing dictzip.");
    {
        let mut dw = ContainerWriter::new(tmp.as_file_mut());
        if let Some(c) = encrypter {
            dw.set_encrypter(c);
        }
        pack(&mut dw, input)?;
        dw.finalize(&ExternalMarisaCodec)?;
    }

    eprintln!("Renaming output file.");
    tmp.persist(output)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.error))?;

    eprintln!("Successfully packed dictdir {:?} to dictzip {:?}.", input, output);
    Ok(())
}
