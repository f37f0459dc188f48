use std::{
    env,
    error::Error,
    fmt::Write as _,
    fs,
    path::PathBuf,
    process,
};

/// One problem definition from the CSV file.
struct ProblemDef {
    /// The code that users know this problem as. Codes are stable between
    /// releases so that documentation and suppressions keep working.
    code: String,
    /// The enumeration variant name. Not promised to be stable.
    name: String,
    /// The category variant name. Must be a variant of `Category` in lib.rs.
    category: String,
    /// The constant message describing the problem.
    message: String,
}

const CATEGORIES: [&str; 4] = ["Extraction", "Syntax", "Semantic", "Configuration"];

fn read_definitions() -> Result<Vec<ProblemDef>, Box<dyn Error>> {
    println!("cargo:rerun-if-changed=resources/problem-codes.csv");

    let mut src_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    src_path.push("resources");
    src_path.push("problem-codes.csv");

    let src = fs::read_to_string(src_path)?;
    let mut defs = vec![];
    let mut rdr = csv::Reader::from_reader(src.as_bytes());
    for result in rdr.records() {
        let record = result?;
        let field = |index: usize| -> Result<String, Box<dyn Error>> {
            record
                .get(index)
                .map(|value| value.to_string())
                .ok_or_else(|| format!("Record {:?} is not valid at column {}", record, index).into())
        };
        let def = ProblemDef {
            code: field(0)?,
            name: field(1)?,
            category: field(2)?,
            message: field(3)?,
        };
        if !CATEGORIES.contains(&def.category.as_str()) {
            return Err(format!("Record {:?} has unknown category {}", record, def.category).into());
        }
        defs.push(def);
    }
    Ok(defs)
}

fn create_problems() -> Result<(), Box<dyn Error>> {
    let defs = read_definitions()?;

    let mut out = String::new();
    writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]")?;
    writeln!(out, "pub enum Problem {{")?;
    for def in &defs {
        writeln!(out, "    {},", def.name)?;
    }
    writeln!(out, "}}\n")?;

    writeln!(out, "impl Problem {{")?;

    writeln!(out, "    /// Returns the stable code for the problem.")?;
    writeln!(out, "    pub fn code(&self) -> &'static str {{")?;
    writeln!(out, "        match self {{")?;
    for def in &defs {
        writeln!(out, "            Problem::{} => \"{}\",", def.name, def.code)?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}\n")?;

    writeln!(out, "    /// Returns the constant message for the problem. Details that")?;
    writeln!(out, "    /// depend on a particular instance belong in diagnostic labels.")?;
    writeln!(out, "    pub fn message(&self) -> &'static str {{")?;
    writeln!(out, "        match self {{")?;
    for def in &defs {
        writeln!(out, "            Problem::{} => \"{}\",", def.name, def.message)?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}\n")?;

    writeln!(out, "    /// Returns the pipeline stage that reports the problem.")?;
    writeln!(out, "    pub fn category(&self) -> Category {{")?;
    writeln!(out, "        match self {{")?;
    for def in &defs {
        writeln!(
            out,
            "            Problem::{} => Category::{},",
            def.name, def.category
        )?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;

    writeln!(out, "}}")?;

    let mut out_path = PathBuf::from(env::var("OUT_DIR")?);
    out_path.push("problems.rs");
    fs::write(out_path, out)?;

    Ok(())
}

fn main() {
    if let Err(err) = create_problems() {
        println!("problem generating problems.rs: {}", err);
        process::exit(1);
    }
}
