//! The `remindful init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create remindful.toml
    if std::path::Path::new("remindful.toml").exists() {
        println!("remindful.toml already exists, skipping.");
    } else {
        std::fs::write("remindful.toml", SAMPLE_CONFIG)?;
        println!("Created remindful.toml");
    }

    // Create the standard word lists
    std::fs::create_dir_all("vocabularies")?;
    for (name, content) in [
        ("vocabularies/list-a.toml", LIST_A),
        ("vocabularies/list-b.toml", LIST_B),
    ] {
        if std::path::Path::new(name).exists() {
            println!("{name} already exists, skipping.");
        } else {
            std::fs::write(name, content)?;
            println!("Created {name}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Review remindful.toml and the word lists");
    println!("  2. Run: remindful validate --vocabulary vocabularies");
    println!("  3. Run: remindful run --subject <id>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# remindful configuration

vocabulary_dir = "./vocabularies"
output_dir = "./remindful-results"

# Uncomment to record every administration under one subject.
# subject = "anon"

interference_secs = 120
free_recall_secs = 90

# Matching while the sheet is still on display. Fuzzy forgives typos;
# the threshold is the similarity floor out of 100.
[learning_matching]
mode = "fuzzy"
threshold = 85

# Matching for immediate cued recall. The standard form requires the
# exact word.
[immediate_matching]
mode = "exact"
"#;

const LIST_A: &str = r#"[vocabulary]
id = "standard"
name = "Standard word list"
description = "Sixteen everyday words taught in four sheets of four"
version = "list-a"
sheet_size = 4

[[items]]
cue = "fruit"
target = "apple"

[[items]]
cue = "vehicle"
target = "truck"

[[items]]
cue = "furniture"
target = "couch"

[[items]]
cue = "animal"
target = "dog"

[[items]]
cue = "bird"
target = "eagle"

[[items]]
cue = "tool"
target = "hammer"

[[items]]
cue = "flower"
target = "tulip"

[[items]]
cue = "instrument"
target = "guitar"

[[items]]
cue = "clothing"
target = "jacket"

[[items]]
cue = "fish"
target = "salmon"

[[items]]
cue = "beverage"
target = "coffee"

[[items]]
cue = "insect"
target = "beetle"

[[items]]
cue = "vegetable"
target = "carrot"

[[items]]
cue = "building"
target = "castle"

[[items]]
cue = "weather"
target = "thunder"

[[items]]
cue = "metal"
target = "copper"
"#;

const LIST_B: &str = r#"[vocabulary]
id = "standard"
name = "Standard word list, alternate form"
description = "Same cue categories as list-a with different exemplars, for retesting"
version = "list-b"
sheet_size = 4

[[items]]
cue = "fruit"
target = "banana"

[[items]]
cue = "vehicle"
target = "wagon"

[[items]]
cue = "furniture"
target = "dresser"

[[items]]
cue = "animal"
target = "horse"

[[items]]
cue = "bird"
target = "falcon"

[[items]]
cue = "tool"
target = "wrench"

[[items]]
cue = "flower"
target = "orchid"

[[items]]
cue = "instrument"
target = "violin"

[[items]]
cue = "clothing"
target = "sweater"

[[items]]
cue = "fish"
target = "trout"

[[items]]
cue = "beverage"
target = "cider"

[[items]]
cue = "insect"
target = "cricket"

[[items]]
cue = "vegetable"
target = "turnip"

[[items]]
cue = "building"
target = "temple"

[[items]]
cue = "weather"
target = "blizzard"

[[items]]
cue = "metal"
target = "nickel"
"#;
