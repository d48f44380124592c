//! Calculates the dictzip shard prefix for one or more words.
//!
//! Grounded in `examples/original_source/cmd/dictutil/prefix.go`.

use std::process::ExitCode;

use kobo_dictzip::prefix::word_prefix;

fn main() -> ExitCode {
    let matches = clap::Command::new("dictzip-prefix")
        .version(clap::crate_version!())
        .about("Calculates the prefix for one or more words")
        .arg(
            clap::Arg::new("format")
                .short('f')
                .long("format")
                .help("The output format (go-slice, go-map, csv, tsv, json-array, json-object)")
                .default_value("json-array")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("WORD")
                .help("Word(s) to calculate the prefix for")
                .required(true)
                .multiple_values(true)
                .index(1),
        )
        .get_matches();

    let format = matches.value_of("format").unwrap();
    if !["go-slice", "go-map", "csv", "tsv", "json-array", "json-object"].contains(&format) {
        eprintln!("Error: invalid format {:?}, see --help for more details.", format);
        return ExitCode::from(2);
    }

    let words: Vec<&str> = matches.values_of("WORD").unwrap().collect();

    match format {
        "go-slice" => println!("[][]string{{"),
        "go-map" => println!("map[string]string{{"),
        "csv" | "tsv" => {}
        "json-array" => println!("["),
        "json-object" => println!("{{"),
        _ => unreachable!(),
    }

    for (i, word) in words.iter().enumerate() {
        let prefix = word_prefix(word);
        let last = i == words.len() - 1;

        match format {
            "go-slice" => println!("\t{{{:?}, {:?}}},", word, prefix),
            "go-map" => println!("\t{:?}: {:?},", word, prefix),
            "csv" => println!("{},{}", word, prefix),
            "tsv" => println!("{}\t{}", word, prefix),
            "json-array" => print!("    [{:?}, {:?}]{}\n", word, prefix, if last { "" } else { "," }),
            "json-object" => print!("    {:?}: {:?}{}\n", word, prefix, if last { "" } else { "," }),
            _ => unreachable!(),
        }
    }

    match format {
        "csv" | "tsv" => {}
        "json-array" => println!("]"),
        "json-object" | "go-slice" | "go-map" => println!("}}"),
        _ => unreachable!(),
    }

    ExitCode::SUCCESS
}
