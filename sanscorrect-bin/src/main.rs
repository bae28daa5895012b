use std::io::{self, Read};

use gumdrop::Options;
use serde::Serialize;

use sanscorrect::context::{ContextDetector, HeuristicDetector};
use sanscorrect::lexicon::LexiconStore;
use sanscorrect::pipeline::{CorrectionPipeline, PipelineConfig, SegmentMetrics};
use sanscorrect::tokenizer::Tokenize;

trait OutputWriter {
    fn write_segment(&mut self, original: &str, corrected: &str, metrics: &SegmentMetrics);
    fn finish(&mut self);
}

struct StdoutWriter {
    show_metrics: bool,
}

impl OutputWriter for StdoutWriter {
    fn write_segment(&mut self, original: &str, corrected: &str, metrics: &SegmentMetrics) {
        if corrected == original {
            println!("{}\t\t[UNCHANGED]", original);
        } else {
            println!("{}\t\t[{} corrections]", corrected, metrics.total_corrections);
        }
        if self.show_metrics {
            for step in &metrics.steps {
                if step.corrections > 0 {
                    println!("  {}: {}", step.step, step.corrections);
                }
            }
        }
    }

    fn finish(&mut self) {}
}

#[derive(Serialize)]
struct SegmentResult {
    original: String,
    corrected: String,
    metrics: SegmentMetrics,
}

#[derive(Serialize)]
struct JsonWriter {
    results: Vec<SegmentResult>,
}

impl JsonWriter {
    pub fn new() -> JsonWriter {
        JsonWriter { results: vec![] }
    }
}

impl OutputWriter for JsonWriter {
    fn write_segment(&mut self, original: &str, corrected: &str, metrics: &SegmentMetrics) {
        self.results.push(SegmentResult {
            original: original.to_owned(),
            corrected: corrected.to_owned(),
            metrics: metrics.clone(),
        });
    }

    fn finish(&mut self) {
        println!(
            "{}",
            serde_json::to_string_pretty(self).expect("serializing results")
        );
    }
}

fn run(
    pipeline: &CorrectionPipeline,
    segments: Vec<String>,
    writer: &mut dyn OutputWriter,
) {
    for segment in segments {
        let mut metrics = SegmentMetrics::default();
        let (corrected, _) = pipeline.process_with_metrics(&segment, &mut metrics);
        writer.write_segment(&segment, &corrected, &metrics);
    }
}

#[derive(Debug, Options)]
struct Args {
    #[options(help = "print help message")]
    help: bool,

    #[options(command)]
    command: Option<Command>,
}

#[derive(Debug, Options)]
enum Command {
    #[options(help = "correct transcription segments")]
    Correct(CorrectArgs),

    #[options(help = "classify segment language context")]
    Detect(DetectArgs),

    #[options(help = "print input in word-separated tokenized form")]
    Tokenize(TokenizeArgs),
}

#[derive(Debug, Options)]
struct CorrectArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "JSON lexicon file(s), in priority order")]
    lexicon: Vec<String>,

    #[options(
        short = "a",
        help = "aggressive ASR mode (weak english demoted, lowered prayer threshold)"
    )]
    aggressive: bool,

    #[options(no_short, long = "metrics", help = "show per-step correction counts")]
    show_metrics: bool,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "segment texts to be corrected, one per argument")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct DetectArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(free, help = "segment texts to be classified")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct TokenizeArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(free, help = "text to be tokenized")]
    inputs: Vec<String>,
}

fn read_segments(inputs: Vec<String>) -> Vec<String> {
    if inputs.is_empty() {
        eprintln!("Reading from stdin...");
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .expect("reading stdin");
        buffer
            .trim()
            .split('\n')
            .map(|x| x.trim().to_string())
            .filter(|x| !x.is_empty())
            .collect()
    } else {
        inputs
    }
}

fn correct(args: CorrectArgs) -> anyhow::Result<()> {
    let lexicon = if args.lexicon.is_empty() {
        LexiconStore::new()
    } else {
        LexiconStore::from_sources(&args.lexicon)
    };

    let config = if args.aggressive {
        PipelineConfig::asr()
    } else {
        PipelineConfig::default()
    };
    let pipeline = CorrectionPipeline::new(lexicon, config);

    let mut writer: Box<dyn OutputWriter> = if args.use_json {
        Box::new(JsonWriter::new())
    } else {
        Box::new(StdoutWriter {
            show_metrics: args.show_metrics,
        })
    };

    let segments = read_segments(args.inputs);
    run(&pipeline, segments, &mut *writer);
    writer.finish();

    Ok(())
}

fn detect(args: DetectArgs) -> anyhow::Result<()> {
    let detector = HeuristicDetector;
    for segment in read_segments(args.inputs) {
        let result = detector.detect(&segment);
        println!(
            "{:?} ({:.2}): \"{}\"",
            result.context_type, result.confidence, segment
        );
    }
    Ok(())
}

fn tokenize(args: TokenizeArgs) -> anyhow::Result<()> {
    let inputs: String = if args.inputs.is_empty() {
        eprintln!("Reading from stdin...");
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .expect("reading stdin");
        buffer
    } else {
        args.inputs.join(" ")
    };

    for (index, word) in inputs.words().enumerate() {
        println!("{:>4}: \"{}\"", index, word);
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse_args_default_or_exit();

    match args.command {
        None => Ok(()),
        Some(Command::Correct(args)) => correct(args),
        Some(Command::Detect(args)) => detect(args),
        Some(Command::Tokenize(args)) => tokenize(args),
    }
}
