/*! Spellchecking for Markdown documents.

Words are looked up in a frequency dictionary indexed with the symmetric
delete algorithm, which finds every dictionary term within a small edit
distance of a misspelling without scanning the whole dictionary. On top of
the index sit a Markdown aware tokenizer that leaves URLs, links and code
alone, an ordered set of skip rules, and a session type that keeps a cursor
over the misspellings of a document while the user fixes them.

# Usage

```no_run
use wrtrspell::session::SpellcheckSession;
use wrtrspell::service::{LoadOptions, SpellerService};

let service = SpellerService::new(LoadOptions::default());
let speller = service.wait().expect("dictionary");

let mut session = SpellcheckSession::new(speller);
let document = "Ths is a typo.";
session.check_text(document);

if let Some(entry) = session.get_current_word() {
    println!("{} at {}: {:?}", entry.word, entry.offset, entry.suggestions);
}
let fixed = session.apply_suggestion(document, 0, false)?;
println!("{}", fixed.document);
# Ok::<(), wrtrspell::speller::error::SpellerError>(())
```

The `wrtrspell` binary in this repository is a command line front end for
the same API.
*/

pub mod cursor;
pub mod dictionary;
pub mod paths;
pub mod position;
pub mod service;
pub mod session;
pub mod skip;
pub mod speller;
pub mod tokenizer;
pub mod worker;

pub use crate::cursor::{MisspelledEntry, MisspellingList, NavigationMode};
pub use crate::position::{offset_to_position, position_to_offset, Position};
pub use crate::speller::error::SpellerError;
pub use crate::speller::suggestion::Suggestion;
pub use crate::speller::{Speller, SpellerConfig};
