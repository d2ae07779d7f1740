use clap::{Arg, App};
use log::info;

use std::error::Error;
use std::fs;

use lpr_classic::{ Config, Lpr };
use lpr_classic::snapshot::{ DirectorySink, NullSink, SnapshotSink };
use lpr_classic::utils;


fn main() -> Result<(), Box<dyn Error>>{
    let matches = App::new("LPR")
                    .version("0.1.0")
                    .author("kingrong")
                    .about("Finds a license plate and its six characters with classical image processing")
                    .arg(Arg::with_name("INPUT")
                        .help("image file with license plate (PPM, PGM, PBM or anything the image crate reads)")
                        .required(true)
                        .index(1))
                    .arg(Arg::with_name("OUTPUT_DIR")
                        .help("directory for intermediate images and extracted characters")
                        .required(true)
                        .index(2))
                    .arg(Arg::with_name("config")
                        .long("config")
                        .short("c")
                        .value_name("FILE")
                        .help("JSON file overriding detector thresholds")
                        .takes_value(true))
                    .arg(Arg::with_name("no-snapshots")
                        .long("no-snapshots")
                        .help("do not write intermediate images"))
                    .arg(Arg::with_name("json")
                        .long("json")
                        .help("print the detected plate as JSON"))
                    .arg(Arg::with_name("verbose")
                        .short("v")
                        .multiple(true)
                        .help("more logging, repeat for trace"))
                    .get_matches();
    utils::init_logger(matches.occurrences_of("verbose"));

    let file_name = matches.value_of("INPUT").ok_or("image is required")?;
    let output_dir = matches.value_of("OUTPUT_DIR").ok_or("output directory is required")?;
    let config = match matches.value_of("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let sink: Box<dyn SnapshotSink> = if matches.is_present("no-snapshots") {
        Box::new(NullSink)
    } else {
        fs::create_dir_all(output_dir)?;
        Box::new(DirectorySink::new(output_dir))
    };

    let lpr = Lpr::new(config);
    let detection = lpr.process_image(file_name, sink.as_ref())?;

    if matches.is_present("json") {
        println!("{}", serde_json::to_string_pretty(&detection.plate)?);
    }
    match &detection.plate {
        Some(plate) => {
            println!("plate found at {}", utils::format_box(&plate.region.bbox));
            for (i, c) in plate.characters.iter().enumerate() {
                println!("  character {} at {}", i + 1, utils::format_box(&c.region.bbox));
            }
        },
        None => println!("plate not found ({} regions inspected)", detection.regions.len()),
    }
    info!("processing of {} finished", file_name);

    Ok(())
}
