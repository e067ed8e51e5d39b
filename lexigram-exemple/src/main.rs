use lexigram_core::model::counts::ModelOrder;
use lexigram_core::model::letter_model::LetterModel;
use lexigram_core::model::sampler::NameSampler;

/// Prints the 100 best and 100 worst candidates by model score.
fn print_names(model: &LetterModel, names: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    // Log-transform happened once at model construction; ranking reuses
    // the shared scorer instead of re-deriving it per name
    let scorer = model.scorer();
    let alphabet = model.alphabet();

    let mut ranked: Vec<(String, f64)> = Vec::with_capacity(names.len());
    for name in names {
        ranked.push((name.clone(), scorer.score(&alphabet.encode(name)?)));
    }
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let top: Vec<&str> = ranked.iter().take(100).map(|(n, _)| n.as_str()).collect();
    println!("\nThe top-100 names:\n{:?}", top);

    let bottom: Vec<&str> = ranked.iter().rev().take(100).map(|(n, _)| n.as_str()).collect();
    println!("\nThe bottom-100 names:\n{:?}", bottom);

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Learn letter transitions from the wordlist (first run writes
    // data/words.bin; later runs load the cache)
    let model = LetterModel::new("./data/words.txt", ModelOrder::Order1, 1.0)?;
    let transitions: u64 = model.counts().cells().iter().sum();
    println!("Learned from {} words ({} transitions)", model.word_count(), transitions);

    // Candidate names are drawn from the cartesian product of these parts
    let prefixes = vec![
        "", "nano", "micro", "iso", "thermo", "meta", "chem", "multi",
        "ex", "post", "inter", "net", "gen", "auto", "proto", "trans",
        "syn", "bio", "exa", "dyna", "proteo", "mol", "evo", "over",
        "uber", "insta",
    ];
    let stems = vec![
        "cal", "calor", "met", "metr", "enthalp", "phase",
        "array", "heat", "kelvin", "react", "ensembl",
        "boltz", "space", "densi", "solu", "stat", "state",
    ];
    let suffixes = vec![
        "", "ry", "ly", "lr", "ble", "nix", "ic", "er",
        "gen", "tech", "inc", "gram",
        "ful", "dyn", "co", "bit",
    ];

    let raw_parts: Vec<String> = prefixes
        .iter()
        .chain(stems.iter())
        .chain(suffixes.iter())
        .map(|s| s.to_string())
        .collect();

    let sampler = NameSampler::new(
        [prefixes, stems, suffixes]
            .into_iter()
            .map(|part| part.into_iter().map(str::to_owned).collect())
            .collect(),
    );
    println!("There are {} possible names given the inputs", sampler.possibilities());

    let n_samples = 1000;
    println!("Sampling {} of these...", n_samples);
    let mut rng = rand::rng();
    let names = sampler.sample_set(n_samples, &mut rng);

    // Drop candidates that are already dictionary words or equal to an
    // input part
    let names: Vec<String> = names
        .into_iter()
        .filter(|name| !model.contains(name) && !raw_parts.contains(name))
        .collect();

    println!("Most likely transitions: {:?}", model.most_likely_transitions()?);
    println!("Least likely transitions: {:?}", model.least_likely_transitions()?);

    print_names(&model, &names)?;

    // Repair the candidates round by round: a name unchanged by the last
    // pass has reached a fixed point and leaves the working set
    println!("\nRepairing words...\n");
    let engine = model.repair_engine(false)?;
    let alphabet = model.alphabet();

    let mut working_set: Vec<Vec<usize>> = Vec::with_capacity(names.len());
    for name in &names {
        working_set.push(alphabet.encode(name)?);
    }

    let mut iter_count = 1;
    while !working_set.is_empty() && iter_count <= 10 {
        println!("Repairing words: round {}...", iter_count);

        let mut repaired = Vec::new();
        for sequence in &working_set {
            let result = engine.repair(sequence);
            if result != *sequence {
                repaired.push(result);
            }
        }
        println!("{} of {} words were repaired...", repaired.len(), working_set.len());

        if !repaired.is_empty() {
            let mut decoded = Vec::with_capacity(repaired.len());
            for sequence in &repaired {
                decoded.push(alphabet.decode(sequence)?);
            }
            print_names(&model, &decoded)?;
        }

        working_set = repaired;
        iter_count += 1;
    }

    Ok(())
}
