//! Loads whitespace-separated "name value" records from a file into an AVL
//! tree and prints the upper levels of the result.
//!
//! Run with: `cargo run --example load_and_print -- records.txt`

use std::env;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;
use std::time::Instant;

use avl_build::{AvlTree, RecordSource, SourceFormatError};

const MAX_PRINT_DEPTH: usize = 10;

/// A named integer record, ordered by name and then by value.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct Student {
    name: String,
    value: i32,
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.value)
    }
}

/// Reads one record per non-empty line: a name and an integer value.
struct StudentFile<R> {
    lines: io::Lines<R>,
}

impl<R: BufRead> RecordSource for StudentFile<R> {
    type Record = Student;

    fn next_record(&mut self) -> Result<Option<Student>, SourceFormatError> {
        loop {
            let line = match self.lines.next() {
                None => return Ok(None),
                Some(line) => line.map_err(|err| SourceFormatError::new(err.to_string()))?,
            };
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(name), Some(value), None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(SourceFormatError::new(format!(
                    "expected `name value`, got {line:?}"
                )));
            };
            let value: i32 = value
                .parse()
                .map_err(|_| SourceFormatError::new(format!("invalid value in {line:?}")))?;
            return Ok(Some(Student {
                name: name.to_string(),
                value,
            }));
        }
    }
}

fn main() -> ExitCode {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "load_and_print".to_string());
    let Some(filename) = args.next() else {
        eprintln!("Usage: {program} filename");
        return ExitCode::FAILURE;
    };

    let file = match File::open(&filename) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Cannot open file {filename}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let mut source = StudentFile {
        lines: BufReader::new(file).lines(),
    };
    let mut tree = AvlTree::new();
    if let Err(err) = tree.build_from(&mut source) {
        eprintln!("Cannot read file {filename}: {err}");
        return ExitCode::FAILURE;
    }
    let elapsed = start.elapsed();

    println!("Loaded {} records in {:.2?}", tree.len(), elapsed);
    if let Err(err) = tree.write_to_depth(MAX_PRINT_DEPTH, &mut io::stdout().lock()) {
        eprintln!("Cannot write tree: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
