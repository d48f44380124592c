//! Converts a dictzip into a dictfile (approximately; see module docs).
//!
//! Grounded in `examples/original_source/examples/dictzip-decompile/main.go`.

use std::fs::File;
use std::io;
use std::process::ExitCode;

use kobo_dictzip::container::Reader as ContainerReader;
use kobo_dictzip::decompile::decompile;
use kobo_dictzip::dictfile::write_dict_file;
use kobo_dictzip::trie::ExternalMarisaCodec;

fn main() -> ExitCode {
    env_logger::init();

    let matches = clap::Command::new("dictzip-decompile")
        .version(clap::crate_version!())
        .about("Converts a dictzip into a dictfile (experimental, output may not be perfect on complex dictionaries)")
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("The output filename (will be overwritten if it exists) (- for stdout)")
                .default_value("decompiled.df")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("resources")
                .short('r')
                .long("resources")
                .help("Also extract referenced resources into the current directory (existing files are overwritten)"),
        )
        .arg(
            clap::Arg::new("DICTZIP")
                .help("Path to the dictzip to decompile")
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
    let input = matches.value_of("DICTZIP").unwrap();

    eprintln!("Opening input dictzip.");
    let f = File::open(input)?;

    eprintln!("Parsing dictzip.");
    let mut r = ContainerReader::new(f, &ExternalMarisaCodec)?;

    eprintln!("Decompiling dictzip.");
    let html_names: Vec<String> = r.dicthtml.iter().map(|e| e.name.clone()).collect();
    let mut shards = Vec::with_capacity(html_names.len());
    for name in &html_names {
        shards.push(r.open_dicthtml(name)?);
    }
    let df = decompile(&shards)?;

    if matches.is_present("resources") {
        eprintln!("Extracting resources.");
        let file_names: Vec<String> = r.files.iter().map(|e| e.name.clone()).collect();
        for name in &file_names {
            eprintln!("  ./{}", name);
            let content = r.open_file(name)?;
            std::fs::write(name, content)?;
        }
    } else if !r.files.is_empty() {
        eprintln!(
            "Warning: dictzip contains {} resources, but skipping because resource extraction is not enabled (see --help for more details).",
            r.files.len()
        );
    }

    eprintln!("Writing dictfile.");
    let output = matches.value_of("output").unwrap();
    if output == "-" {
        write_dict_file(&df, io::stdout().lock())?;
    } else {
        write_dict_file(&df, File::create(output)?)?;
    }

    eprintln!(
        "Successfully converted {} entries from dictzip {:?} to dictfile {}.",
        df.len(),
        input,
        output
    );
    Ok(())
}
