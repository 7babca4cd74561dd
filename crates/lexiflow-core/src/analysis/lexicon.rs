//! Per-language word lists and suffix rules used by the heuristic tagger.
//!
//! Closed-class lists are meant to be reasonably complete for common text.
//! The open-class seed lexicon only covers frequent words whose shape the
//! suffix rules would get wrong; everything else is guessed from context.

use lexiflow_types::analysis::PartOfSpeech;
use lexiflow_types::language::Language;

use PartOfSpeech::{Adj, Noun, Verb};

/// Known form, its part of speech, and its lemma when it differs.
pub type LexiconEntry = (&'static str, PartOfSpeech, Option<&'static str>);

/// Suffix and the class it signals. `None` marks an adverbial suffix,
/// which is treated as non-content.
pub type SuffixRule = (&'static str, Option<PartOfSpeech>);

pub struct LanguageRules {
    /// Determiners, prepositions, pronouns, conjunctions, auxiliaries.
    pub function_words: &'static [&'static str],
    /// Words after which a bare token is most likely a noun.
    pub determiners: &'static [&'static str],
    /// Copulas after which a bare token is most likely an adjective.
    pub copulas: &'static [&'static str],
    pub lexicon: &'static [LexiconEntry],
    /// Checked in order; first match wins.
    pub suffixes: &'static [SuffixRule],
    /// Minimum token length (chars) for suffix rules to apply.
    pub min_suffix_len: usize,
    /// German capitalizes all nouns, not just proper ones.
    pub capitalized_nouns: bool,
}

impl LanguageRules {
    pub fn lookup(&self, normalized: &str) -> Option<&LexiconEntry> {
        self.lexicon.iter().find(|(form, _, _)| *form == normalized)
    }

    pub fn is_function_word(&self, normalized: &str) -> bool {
        self.function_words.contains(&normalized)
            || self.determiners.contains(&normalized)
            || self.copulas.contains(&normalized)
    }

    pub fn suffix_class(&self, normalized: &str) -> Option<Option<PartOfSpeech>> {
        if normalized.chars().count() < self.min_suffix_len {
            return None;
        }
        self.suffixes
            .iter()
            .find(|(suffix, _)| normalized.ends_with(suffix))
            .map(|(_, class)| *class)
    }
}

pub fn rules_for(language: Language) -> &'static LanguageRules {
    match language {
        Language::Es => &SPANISH,
        Language::En => &ENGLISH,
        Language::Fr => &FRENCH,
        Language::De => &GERMAN,
        Language::It => &ITALIAN,
        Language::Pt => &PORTUGUESE,
        Language::La => &LATIN,
    }
}

// ---------------------------------------------------------------------------
// Spanish
// ---------------------------------------------------------------------------

static SPANISH: LanguageRules = LanguageRules {
    function_words: &[
        "en", "de", "a", "con", "por", "para", "sin", "sobre", "entre", "hasta", "desde", "hacia",
        "contra", "según", "y", "o", "e", "u", "ni", "pero", "sino", "que", "porque", "como",
        "cuando", "donde", "si", "aunque", "yo", "tú", "él", "ella", "ello", "nosotros", "nosotras",
        "vosotros", "ellos", "ellas", "usted", "ustedes", "me", "te", "se", "nos", "os", "le",
        "les", "lo", "mí", "ti", "sí", "no", "muy", "más", "menos", "también", "tampoco", "ya",
        "aquí", "allí", "ahí", "hoy", "ayer", "mañana", "siempre", "nunca", "ha", "han", "he",
        "hemos", "había", "habían", "hay", "qué", "quién", "cuál", "cómo", "dónde", "cuándo",
    ],
    determiners: &[
        "el", "la", "los", "las", "un", "una", "unos", "unas", "este", "esta", "estos", "estas",
        "ese", "esa", "esos", "esas", "aquel", "aquella", "mi", "mis", "tu", "tus", "su", "sus",
        "nuestro", "nuestra", "al", "del", "cada", "otro", "otra",
    ],
    copulas: &[
        "es", "son", "era", "eran", "fue", "ser", "está", "están", "estaba", "estar", "parece",
        "soy", "eres", "somos", "estoy", "estás",
    ],
    lexicon: &[
        ("gato", Noun, None),
        ("perro", Noun, None),
        ("casa", Noun, None),
        ("día", Noun, None),
        ("mujer", Noun, None),
        ("lugar", Noun, None),
        ("hombre", Noun, None),
        ("agua", Noun, None),
        ("ciudad", Noun, None),
        ("tiempo", Noun, None),
        ("duerme", Verb, Some("dormir")),
        ("duermen", Verb, Some("dormir")),
        ("come", Verb, Some("comer")),
        ("vive", Verb, Some("vivir")),
        ("tiene", Verb, Some("tener")),
        ("tienen", Verb, Some("tener")),
        ("hace", Verb, Some("hacer")),
        ("quiere", Verb, Some("querer")),
        ("puede", Verb, Some("poder")),
        ("habla", Verb, Some("hablar")),
        ("grande", Adj, None),
        ("pequeño", Adj, None),
        ("pequeña", Adj, None),
        ("bueno", Adj, None),
        ("buena", Adj, None),
        ("nuevo", Adj, None),
        ("nueva", Adj, None),
        ("viejo", Adj, None),
        ("vieja", Adj, None),
    ],
    suffixes: &[
        ("mente", None),
        ("ción", Some(Noun)),
        ("sión", Some(Noun)),
        ("dad", Some(Noun)),
        ("tad", Some(Noun)),
        ("miento", Some(Noun)),
        ("ismo", Some(Noun)),
        ("ista", Some(Noun)),
        ("eza", Some(Noun)),
        ("oso", Some(Adj)),
        ("osa", Some(Adj)),
        ("ble", Some(Adj)),
        ("ivo", Some(Adj)),
        ("iva", Some(Adj)),
        ("ando", Some(Verb)),
        ("iendo", Some(Verb)),
        ("aba", Some(Verb)),
        ("aban", Some(Verb)),
        ("ar", Some(Verb)),
        ("er", Some(Verb)),
        ("ir", Some(Verb)),
    ],
    min_suffix_len: 5,
    capitalized_nouns: false,
};

// ---------------------------------------------------------------------------
// English
// ---------------------------------------------------------------------------

static ENGLISH: LanguageRules = LanguageRules {
    function_words: &[
        "in", "on", "at", "of", "to", "for", "with", "from", "by", "about", "into", "over",
        "under", "after", "before", "between", "through", "and", "or", "but", "nor", "so", "yet",
        "because", "although", "while", "if", "than", "then", "that", "which", "who", "whom",
        "whose", "what", "when", "where", "why", "how", "i", "you", "he", "she", "it", "we",
        "they", "me", "him", "her", "us", "them", "his", "its", "our", "their", "your", "not",
        "very", "also", "just", "too", "here", "there", "now", "have", "has", "had", "do",
        "does", "did", "will", "would", "can", "could", "shall", "should", "may", "might",
        "must", "don't", "doesn't", "didn't", "won't", "can't", "isn't", "aren't",
    ],
    determiners: &[
        "the", "a", "an", "this", "that", "these", "those", "my", "your", "his", "her", "its",
        "our", "their", "some", "any", "every", "each", "no",
    ],
    copulas: &[
        "is", "are", "was", "were", "be", "been", "being", "am", "seems", "seem", "looks",
        "become", "becomes",
    ],
    lexicon: &[
        ("cat", Noun, None),
        ("dog", Noun, None),
        ("house", Noun, None),
        ("day", Noun, None),
        ("time", Noun, None),
        ("water", Noun, None),
        ("people", Noun, Some("person")),
        ("sleeps", Verb, Some("sleep")),
        ("runs", Verb, Some("run")),
        ("went", Verb, Some("go")),
        ("goes", Verb, Some("go")),
        ("said", Verb, Some("say")),
        ("made", Verb, Some("make")),
        ("big", Adj, None),
        ("small", Adj, None),
        ("good", Adj, None),
        ("new", Adj, None),
        ("old", Adj, None),
        ("large", Adj, None),
    ],
    suffixes: &[
        ("ly", None),
        ("tion", Some(Noun)),
        ("sion", Some(Noun)),
        ("ness", Some(Noun)),
        ("ment", Some(Noun)),
        ("ity", Some(Noun)),
        ("ism", Some(Noun)),
        ("ship", Some(Noun)),
        ("hood", Some(Noun)),
        ("ous", Some(Adj)),
        ("ful", Some(Adj)),
        ("less", Some(Adj)),
        ("able", Some(Adj)),
        ("ible", Some(Adj)),
        ("ive", Some(Adj)),
        ("ical", Some(Adj)),
        ("ize", Some(Verb)),
        ("ise", Some(Verb)),
        ("ify", Some(Verb)),
        ("ing", Some(Verb)),
        ("ed", Some(Verb)),
    ],
    min_suffix_len: 5,
    capitalized_nouns: false,
};

// ---------------------------------------------------------------------------
// French
// ---------------------------------------------------------------------------

static FRENCH: LanguageRules = LanguageRules {
    function_words: &[
        "à", "dans", "par", "pour", "sur", "sous", "avec", "sans", "chez", "entre", "vers",
        "et", "ou", "mais", "donc", "car", "ni", "que", "qui", "quoi", "dont", "où", "si",
        "comme", "quand", "je", "tu", "il", "elle", "on", "nous", "vous", "ils", "elles", "me",
        "te", "se", "lui", "leur", "eux", "moi", "toi", "ne", "pas", "plus", "très", "aussi",
        "bien", "ici", "là", "ai", "as", "avons", "avez", "ont", "avait",
    ],
    determiners: &[
        "le", "la", "les", "un", "une", "des", "du", "au", "aux", "ce", "cet", "cette", "ces",
        "mon", "ma", "mes", "ton", "ta", "tes", "son", "sa", "ses", "notre", "votre", "leurs",
    ],
    copulas: &[
        "est", "sont", "était", "étaient", "être", "suis", "es", "sommes", "êtes", "semble",
        "devient",
    ],
    lexicon: &[
        ("chat", Noun, None),
        ("chien", Noun, None),
        ("maison", Noun, None),
        ("homme", Noun, None),
        ("femme", Noun, None),
        ("eau", Noun, None),
        ("dort", Verb, Some("dormir")),
        ("mange", Verb, Some("manger")),
        ("aime", Verb, Some("aimer")),
        ("fait", Verb, Some("faire")),
        ("grand", Adj, None),
        ("grande", Adj, None),
        ("petit", Adj, None),
        ("petite", Adj, None),
        ("beau", Adj, None),
        ("belle", Adj, None),
    ],
    suffixes: &[
        ("tion", Some(Noun)),
        ("sion", Some(Noun)),
        ("ité", Some(Noun)),
        ("isme", Some(Noun)),
        ("eur", Some(Noun)),
        ("eux", Some(Adj)),
        ("euse", Some(Adj)),
        ("ique", Some(Adj)),
        ("able", Some(Adj)),
        ("aient", Some(Verb)),
        ("ait", Some(Verb)),
        ("er", Some(Verb)),
        ("ir", Some(Verb)),
    ],
    min_suffix_len: 5,
    capitalized_nouns: false,
};

// ---------------------------------------------------------------------------
// German
// ---------------------------------------------------------------------------

static GERMAN: LanguageRules = LanguageRules {
    function_words: &[
        "in", "an", "auf", "aus", "bei", "mit", "nach", "von", "zu", "für", "über", "unter",
        "durch", "gegen", "ohne", "um", "und", "oder", "aber", "denn", "sondern", "dass", "weil",
        "wenn", "als", "ob", "ich", "du", "er", "sie", "es", "wir", "ihr", "mich", "dich",
        "sich", "uns", "euch", "ihm", "ihn", "nicht", "auch", "sehr", "noch", "schon", "hier",
        "dort", "habe", "hast", "hat", "haben", "hatte", "wird", "werden", "kann", "muss",
    ],
    determiners: &[
        "der", "die", "das", "den", "dem", "des", "ein", "eine", "einen", "einem", "einer",
        "eines", "kein", "keine", "mein", "meine", "dein", "sein", "seine", "unser", "dieser",
        "diese", "dieses",
    ],
    copulas: &["ist", "sind", "war", "waren", "bin", "bist", "seid", "wirkt", "scheint"],
    lexicon: &[
        ("schläft", Verb, Some("schlafen")),
        ("isst", Verb, Some("essen")),
        ("geht", Verb, Some("gehen")),
        ("macht", Verb, Some("machen")),
        ("groß", Adj, None),
        ("klein", Adj, None),
        ("gut", Adj, None),
        ("neu", Adj, None),
        ("alt", Adj, None),
    ],
    suffixes: &[
        ("ung", Some(Noun)),
        ("heit", Some(Noun)),
        ("keit", Some(Noun)),
        ("schaft", Some(Noun)),
        ("ismus", Some(Noun)),
        ("lich", Some(Adj)),
        ("isch", Some(Adj)),
        ("bar", Some(Adj)),
        ("los", Some(Adj)),
        ("sam", Some(Adj)),
        ("ig", Some(Adj)),
        ("ern", Some(Verb)),
        ("eln", Some(Verb)),
        ("en", Some(Verb)),
    ],
    min_suffix_len: 4,
    capitalized_nouns: true,
};

// ---------------------------------------------------------------------------
// Italian
// ---------------------------------------------------------------------------

static ITALIAN: LanguageRules = LanguageRules {
    function_words: &[
        "di", "a", "da", "in", "con", "su", "per", "tra", "fra", "e", "o", "ma", "che", "chi",
        "se", "perché", "come", "quando", "dove", "io", "tu", "lui", "lei", "noi", "voi",
        "loro", "mi", "ti", "si", "ci", "vi", "non", "molto", "più", "anche", "qui", "ha",
        "hanno", "ho", "abbiamo",
    ],
    determiners: &[
        "il", "lo", "la", "i", "gli", "le", "un", "uno", "una", "del", "della", "dei", "delle",
        "al", "alla", "questo", "questa", "quel", "quella", "mio", "mia", "suo", "sua",
    ],
    copulas: &["è", "sono", "era", "erano", "essere", "sei", "siamo", "sembra"],
    lexicon: &[
        ("gatto", Noun, None),
        ("casa", Noun, None),
        ("acqua", Noun, None),
        ("dorme", Verb, Some("dormire")),
        ("mangia", Verb, Some("mangiare")),
        ("grande", Adj, None),
        ("piccolo", Adj, None),
        ("bello", Adj, None),
    ],
    suffixes: &[
        ("mente", None),
        ("zione", Some(Noun)),
        ("sione", Some(Noun)),
        ("tà", Some(Noun)),
        ("mento", Some(Noun)),
        ("ismo", Some(Noun)),
        ("ista", Some(Noun)),
        ("oso", Some(Adj)),
        ("osa", Some(Adj)),
        ("bile", Some(Adj)),
        ("ivo", Some(Adj)),
        ("ando", Some(Verb)),
        ("endo", Some(Verb)),
        ("are", Some(Verb)),
        ("ere", Some(Verb)),
        ("ire", Some(Verb)),
    ],
    min_suffix_len: 5,
    capitalized_nouns: false,
};

// ---------------------------------------------------------------------------
// Portuguese
// ---------------------------------------------------------------------------

static PORTUGUESE: LanguageRules = LanguageRules {
    function_words: &[
        "em", "de", "a", "com", "por", "para", "sem", "sobre", "entre", "até", "e", "ou",
        "mas", "que", "se", "porque", "como", "quando", "onde", "eu", "tu", "ele", "ela", "nós",
        "vós", "eles", "elas", "você", "me", "te", "lhe", "não", "muito", "mais", "também",
        "aqui", "tem", "têm",
    ],
    determiners: &[
        "o", "a", "os", "as", "um", "uma", "uns", "umas", "do", "da", "dos", "das", "no", "na",
        "nos", "nas", "este", "esta", "esse", "essa", "meu", "minha", "seu", "sua",
    ],
    copulas: &["é", "são", "era", "eram", "ser", "está", "estão", "estar", "sou", "parece"],
    lexicon: &[
        ("gato", Noun, None),
        ("casa", Noun, None),
        ("água", Noun, None),
        ("dorme", Verb, Some("dormir")),
        ("come", Verb, Some("comer")),
        ("grande", Adj, None),
        ("pequeno", Adj, None),
        ("bonito", Adj, None),
    ],
    suffixes: &[
        ("mente", None),
        ("ção", Some(Noun)),
        ("são", Some(Noun)),
        ("dade", Some(Noun)),
        ("mento", Some(Noun)),
        ("agem", Some(Noun)),
        ("ismo", Some(Noun)),
        ("oso", Some(Adj)),
        ("osa", Some(Adj)),
        ("vel", Some(Adj)),
        ("ivo", Some(Adj)),
        ("ando", Some(Verb)),
        ("endo", Some(Verb)),
        ("indo", Some(Verb)),
        ("ar", Some(Verb)),
        ("er", Some(Verb)),
        ("ir", Some(Verb)),
    ],
    min_suffix_len: 5,
    capitalized_nouns: false,
};

// ---------------------------------------------------------------------------
// Latin
// ---------------------------------------------------------------------------

static LATIN: LanguageRules = LanguageRules {
    function_words: &[
        "et", "in", "ad", "cum", "de", "ex", "e", "ab", "a", "per", "sub", "pro", "sine", "ob",
        "sed", "aut", "vel", "nec", "neque", "atque", "ac", "que", "non", "ut", "ne", "si",
        "nisi", "quia", "quod", "qui", "quae", "quem", "quam", "ego", "tu", "nos", "vos", "se",
        "me", "te", "is", "ea", "id", "iam", "tum", "nunc", "tamen", "enim", "autem", "ergo",
        "hic", "haec", "hoc", "ille", "illa", "illud",
    ],
    determiners: &[],
    copulas: &["est", "sunt", "erat", "erant", "esse", "sum", "es", "fuit", "videtur"],
    lexicon: &[
        ("puella", Noun, None),
        ("puer", Noun, None),
        ("rosa", Noun, None),
        ("domus", Noun, None),
        ("aqua", Noun, None),
        ("amat", Verb, Some("amo")),
        ("dormit", Verb, Some("dormio")),
        ("videt", Verb, Some("video")),
        ("magnus", Adj, None),
        ("magna", Adj, None),
        ("bonus", Adj, None),
        ("bona", Adj, None),
        ("pulchra", Adj, None),
    ],
    suffixes: &[
        ("tionem", Some(Noun)),
        ("tio", Some(Noun)),
        ("tatem", Some(Noun)),
        ("tas", Some(Noun)),
        ("tudo", Some(Noun)),
        ("bilis", Some(Adj)),
        ("osus", Some(Adj)),
        ("osa", Some(Adj)),
        ("osum", Some(Adj)),
        ("are", Some(Verb)),
        ("ere", Some(Verb)),
        ("ire", Some(Verb)),
        ("unt", Some(Verb)),
        ("ant", Some(Verb)),
        ("ent", Some(Verb)),
    ],
    min_suffix_len: 5,
    capitalized_nouns: false,
};
