use rs_wordcraft_core::{Factor, StatsCruncher, StatsLibrary, WordBuilder};

const TRAINING_TEXT: &str = "Cocineros medievales fueron restringidos a menudo en formas fueron capaces de utilizar, \
tener acceso restringido a hornos debido a los costes de construcción y necesidad de abundantes suministros \
de combustible de cocina. Pies podrían ser fácilmente cocinadas sobre un fuego abierto, al asociarse con un \
panadero les permitió cocinar el relleno dentro de su propia carcasa definida localmente. Las primeras recetas \
de circular como refieren a coffyns, con rectas lados cerrados y un top; abrir mejores pies fueron denominados \
trampas. Esto también puede ser la razón por qué principios recetas centran en el relleno sobre el caso que lo \
rodea, con la desarrollo de asociación hacia el uso de casos de pastel de barro reutilizables que redujo el uso \
de harina de caro.";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=rs_wordcraft_core=trace shows cache hits, promotions and evictions
    env_logger::init();

    // Case-insensitive library: "Cocineros" and "cocineros" feed the same statistics
    let mut library = StatsLibrary::new(false);

    // Split on whitespace plus the extra delimiters
    let words = library.parse_line(TRAINING_TEXT, ",.;")?;
    println!("Learned {} words", words);

    // The cruncher computes the first-character distribution once here
    let mut cruncher = StatsCruncher::new(library);

    // Favor the characters closest to the end of the word
    cruncher.configure(Factor::CloseCharacterPreference(0.6))?;

    // Discourage runs of the same letter a bit more than the default
    cruncher.configure(Factor::SameCharacterWeightAdjust(0.7))?;

    // Invalid factors are rejected and leave the configuration untouched
    match cruncher.configure(Factor::EowFactorThreshold(2.0)) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Rejected: {}", e),
    }

    // An optional seed from the command line makes the output reproducible
    let mut builder = match std::env::args().nth(1) {
        Some(seed) => WordBuilder::with_seed(cruncher, seed.parse()?),
        None => WordBuilder::new(cruncher),
    };

    println!("Free generation");
    for _ in 0..10 {
        let line = builder.generate_words(8, 10, 0.1)?;
        println!("\t{}", line.join(" "));
    }

    println!("Novel words (not in the training text)");
    for i in 0..10 {
        println!("\t{}: {}", i + 1, builder.generate_novel_word(10, 0.1, 100)?);
    }

    let cruncher = builder.cruncher();
    let stats = cruncher.cache_stats();
    println!("Other");
    println!("\tPrimary cache: {:?}", cruncher.primary_cache_contents());
    println!("\tSecondary cache: {:?}", cruncher.secondary_cache_contents());
    println!("\tCache hit rate: {:.1}%", stats.hit_rate() * 100.0);
    println!("\tAlphabet: {:?}", cruncher.library().alphabet());
    println!("\tWord lengths: {}", cruncher.library().word_lengths());

    Ok(())
}
