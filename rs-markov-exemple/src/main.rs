use std::env;

use rs_markov_core::io::{list_files, normalize_folder};
use rs_markov_core::{GenerateOptions, Markov, MarkovError, Sampling};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Folder holding the training files (.dat, one sentence per line)
    let folder = normalize_folder(&env::args().nth(1).unwrap_or_else(|| "./data".to_owned()));

    // Train on every file with two words per state. With a single file, a
    // .2.bin snapshot is written next to it and loaded instead on the next run
    let files: Vec<_> = list_files(&folder, "dat")?
        .iter()
        .map(|file| folder.join(file))
        .collect();
    let app = Markov::from_files(&files, 2)?;
    println!("{} files, {} training sentences", files.len(), app.history().len());

    let structure = app.export();
    println!(
        "{} start words, {} end words, {} states, {} transitions",
        structure.start_words.len(),
        structure.end_words.len(),
        structure.corpus.len(),
        structure.transition_count()
    );

    // Generate 10 sentences. The filter rejects sentences copied verbatim from
    // the training data, the walk is then retried up to 100 times
    for i in 0..10 {
        let options = GenerateOptions::new()
            .with_max_tries(100)
            .with_filter(|result| result.reproduces_reference());

        match app.generate(options) {
            Ok(result) => println!(
                "Generated sentence {}: {} (score {}, {} tries, {} refs)",
                i + 1,
                result.sentence,
                result.score,
                result.tries,
                result.refs.len()
            ),
            Err(MarkovError::EmptyCorpus) => {
                println!("Nothing to generate from, add .dat files to {}", folder.display());
                return Ok(());
            }
            Err(e @ MarkovError::GenerationExhausted { .. }) => println!("Generated sentence {}: {}", i + 1, e),
            Err(e) => return Err(e.into()),
        }
    }

    // Weighted sampling favours transitions observed more often
    let options = GenerateOptions::new().with_sampling(Sampling::Weighted);
    if let Ok(result) = app.generate(options) {
        println!("Weighted: {}", result.sentence);
    }

    Ok(())
}
