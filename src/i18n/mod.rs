//! Internationalization (i18n) module.
//!
//! Provides localized strings for CLI help and output.
//! English is the default language; Spanish is available as an alternative.

use std::sync::OnceLock;

static CURRENT_LANG: OnceLock<Lang> = OnceLock::new();

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    /// English (default)
    En,
    /// Spanish
    Es,
}

impl Lang {
    /// Parse a language code string (e.g. "en", "es", "en_US", "es_ES.UTF-8").
    /// Returns `None` for unrecognized codes.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.to_lowercase();
        let prefix = normalized.split(['_', '-', '.']).next().unwrap_or("");
        match prefix {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            _ => None,
        }
    }

    /// Return the ISO 639-1 code for this language.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }
}

/// Initialize the global language. Call once at startup.
/// If already initialized, this is a no-op.
pub fn set_lang(lang: Lang) {
    let _ = CURRENT_LANG.set(lang);
}

/// Get the currently configured language (defaults to English).
pub fn lang() -> Lang {
    CURRENT_LANG.get().copied().unwrap_or(Lang::En)
}

/// Detect language from `MBOXSPLIT_LANG`, then `LC_MESSAGES`, then `LANG`.
pub fn detect_system_lang() -> Lang {
    ["MBOXSPLIT_LANG", "LC_MESSAGES", "LANG"]
        .iter()
        .find_map(|var| std::env::var(var).ok().and_then(|v| Lang::from_code(&v)))
        .unwrap_or(Lang::En)
}

/// Macro for defining translatable message functions.
/// Each function returns a `&'static str` based on the current language.
macro_rules! msg {
    ($name:ident, $en:expr, $es:expr) => {
        /// Returns a localized string for the current language.
        pub fn $name() -> &'static str {
            match lang() {
                Lang::En => $en,
                Lang::Es => $es,
            }
        }
    };
}

// ── General ──────────────────────────────────────────────────────

msg!(
    app_about,
    "Split a Gmail Takeout MBOX into one archive per label.",
    "Divide un MBOX de Gmail Takeout en un archivo por etiqueta."
);
msg!(
    app_long_about,
    "Split a Gmail Takeout MBOX into one archive per label.\nSystem labels (Spam, Trash, Inbox, Sent) take priority; other messages go to\ntheir first user label, or to Archive. Messages are copied byte-for-byte.",
    "Divide un MBOX de Gmail Takeout en un archivo por etiqueta.\nLas etiquetas del sistema (Spam, Papelera, Recibidos, Enviados) tienen prioridad;\nel resto va a su primera etiqueta de usuario, o a Archive. Los mensajes se copian byte a byte."
);

// ── CLI help strings ─────────────────────────────────────────────

msg!(
    help_infile,
    "Source MBOX file [default: inbox.mbox]",
    "Fichero MBOX de origen [por defecto: inbox.mbox]"
);
msg!(
    help_prefix,
    "Prefix for output filenames [default: split_]",
    "Prefijo de los ficheros de salida [por defecto: split_]"
);
msg!(
    help_output_dir,
    "Directory for output archives [default: .]",
    "Directorio de los archivos de salida [por defecto: .]"
);
msg!(
    help_max_name_length,
    "Maximum length of a label in a filename [default: 120]",
    "Longitud m\u{e1}xima de una etiqueta en un nombre de fichero [por defecto: 120]"
);
msg!(
    help_dry_run,
    "Classify and count messages without writing anything",
    "Clasificar y contar mensajes sin escribir nada"
);
msg!(
    help_json,
    "Print the summary as JSON",
    "Mostrar el resumen en JSON"
);
msg!(
    help_verbose,
    "Verbose logging (-v info, -vv debug, -vvv trace)",
    "Registro detallado (-v info, -vv debug, -vvv trace)"
);
msg!(
    help_lang,
    "Language (en, es). Defaults to system locale",
    "Idioma (en, es). Por defecto usa el idioma del sistema"
);
msg!(
    help_cmd_completions,
    "Generate shell completions",
    "Generar autocompletado para la shell"
);
msg!(
    help_cmd_manpage,
    "Generate a man page",
    "Generar una p\u{e1}gina de manual"
);

// ── Run output ───────────────────────────────────────────────────

msg!(msg_processing, "Processing file", "Procesando fichero");
msg!(msg_with_prefix, "with prefix", "con prefijo");
msg!(msg_reading, "Reading", "Leyendo");
msg!(
    msg_messages_routed,
    "messages routed...",
    "mensajes clasificados..."
);
msg!(msg_split_complete, "Split complete:", "Divisi\u{f3}n completada:");
msg!(
    msg_dry_run_complete,
    "Dry run (nothing written):",
    "Simulaci\u{f3}n (no se ha escrito nada):"
);
msg!(msg_output_file, "Output file", "Fichero de salida");
msg!(msg_messages, "Messages", "Mensajes");
msg!(msg_size, "Size", "Tama\u{f1}o");
msg!(msg_total, "Total", "Total");

// ── Errors ───────────────────────────────────────────────────────

msg!(
    err_file_not_found,
    "File not found",
    "Fichero no encontrado"
);
