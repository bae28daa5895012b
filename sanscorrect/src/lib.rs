/*! Correction of Sanskrit transliteration errors in ASR transcripts.

Implements a multi-stage, deterministic correction pipeline for subtitle
segments produced by automatic speech recognition: context detection,
lexicon-based substitution, prayer/invocation recognition and surgical
span-level editing, with the corrected output rendered in [`IAST`].

All corrections are rule and pattern driven; there is no speech
recognition and no statistical model in this crate.

[`IAST`]: https://en.wikipedia.org/wiki/International_Alphabet_of_Sanskrit_Transliteration

# Usage example

```
use sanscorrect::lexicon::LexiconStore;
use sanscorrect::pipeline::{CorrectionPipeline, PipelineConfig};

let lexicon = LexiconStore::new();
let pipeline = CorrectionPipeline::new(lexicon, PipelineConfig::asr());
let (corrected, _corrections) = pipeline.process("om shanti shanti shanti");
assert!(!corrected.is_empty());
```

Further examples of how to use the library can be found in
`sanscorrect-bin` in the same repository.

*/

#![warn(missing_docs)]
pub mod context;
pub mod lexicon;
pub mod pipeline;
pub mod prayer;
pub mod segment;
pub mod surgical;
pub mod tokenizer;

pub(crate) mod constants;
pub(crate) mod types;
