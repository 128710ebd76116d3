use std::env;
use std::fs;
use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: notate <performance.yaml> [output]");
        process::exit(1);
    }

    let input_path = &args[1];
    let output_path = args.get(2).map(|path| notate::musicxml_file_name(path));

    // Read input file
    let source = match fs::read_to_string(input_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", input_path, e);
            process::exit(1);
        }
    };

    log::info!("Converting {}", input_path);

    let xml = match notate::compile(&source) {
        Ok(xml) => xml,
        Err(e) => {
            eprintln!("Conversion error: {}", e);
            process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &xml) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote MusicXML to {}", path);
        }
        None => {
            println!("{}", xml);
        }
    }
}
