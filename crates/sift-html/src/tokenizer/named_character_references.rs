//! Named character reference lookup table.
//!
//! [§ 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html#named-character-references)
//!
//! Covers the HTML 4 set (Latin-1, symbols, Greek, special characters), the
//! common ASCII punctuation names and a few others. Entries flagged legacy
//! may be written without the trailing semicolon (`&copy` as well as
//! `&copy;`); every other name requires it.

use std::collections::HashMap;
use std::sync::LazyLock;

/// `(name, replacement, legacy)`, name without `&` or `;`.
const ENTITIES: &[(&str, &str, bool)] = &[
    ("nbsp", "\u{A0}", true),
    ("iexcl", "\u{A1}", true),
    ("cent", "\u{A2}", true),
    ("pound", "\u{A3}", true),
    ("curren", "\u{A4}", true),
    ("yen", "\u{A5}", true),
    ("brvbar", "\u{A6}", true),
    ("sect", "\u{A7}", true),
    ("uml", "\u{A8}", true),
    ("copy", "\u{A9}", true),
    ("ordf", "\u{AA}", true),
    ("laquo", "\u{AB}", true),
    ("not", "\u{AC}", true),
    ("shy", "\u{AD}", true),
    ("reg", "\u{AE}", true),
    ("macr", "\u{AF}", true),
    ("deg", "\u{B0}", true),
    ("plusmn", "\u{B1}", true),
    ("sup2", "\u{B2}", true),
    ("sup3", "\u{B3}", true),
    ("acute", "\u{B4}", true),
    ("micro", "\u{B5}", true),
    ("para", "\u{B6}", true),
    ("middot", "\u{B7}", true),
    ("cedil", "\u{B8}", true),
    ("sup1", "\u{B9}", true),
    ("ordm", "\u{BA}", true),
    ("raquo", "\u{BB}", true),
    ("frac14", "\u{BC}", true),
    ("frac12", "\u{BD}", true),
    ("frac34", "\u{BE}", true),
    ("iquest", "\u{BF}", true),
    ("Agrave", "\u{C0}", true),
    ("Aacute", "\u{C1}", true),
    ("Acirc", "\u{C2}", true),
    ("Atilde", "\u{C3}", true),
    ("Auml", "\u{C4}", true),
    ("Aring", "\u{C5}", true),
    ("AElig", "\u{C6}", true),
    ("Ccedil", "\u{C7}", true),
    ("Egrave", "\u{C8}", true),
    ("Eacute", "\u{C9}", true),
    ("Ecirc", "\u{CA}", true),
    ("Euml", "\u{CB}", true),
    ("Igrave", "\u{CC}", true),
    ("Iacute", "\u{CD}", true),
    ("Icirc", "\u{CE}", true),
    ("Iuml", "\u{CF}", true),
    ("ETH", "\u{D0}", true),
    ("Ntilde", "\u{D1}", true),
    ("Ograve", "\u{D2}", true),
    ("Oacute", "\u{D3}", true),
    ("Ocirc", "\u{D4}", true),
    ("Otilde", "\u{D5}", true),
    ("Ouml", "\u{D6}", true),
    ("times", "\u{D7}", true),
    ("Oslash", "\u{D8}", true),
    ("Ugrave", "\u{D9}", true),
    ("Uacute", "\u{DA}", true),
    ("Ucirc", "\u{DB}", true),
    ("Uuml", "\u{DC}", true),
    ("Yacute", "\u{DD}", true),
    ("THORN", "\u{DE}", true),
    ("szlig", "\u{DF}", true),
    ("agrave", "\u{E0}", true),
    ("aacute", "\u{E1}", true),
    ("acirc", "\u{E2}", true),
    ("atilde", "\u{E3}", true),
    ("auml", "\u{E4}", true),
    ("aring", "\u{E5}", true),
    ("aelig", "\u{E6}", true),
    ("ccedil", "\u{E7}", true),
    ("egrave", "\u{E8}", true),
    ("eacute", "\u{E9}", true),
    ("ecirc", "\u{EA}", true),
    ("euml", "\u{EB}", true),
    ("igrave", "\u{EC}", true),
    ("iacute", "\u{ED}", true),
    ("icirc", "\u{EE}", true),
    ("iuml", "\u{EF}", true),
    ("eth", "\u{F0}", true),
    ("ntilde", "\u{F1}", true),
    ("ograve", "\u{F2}", true),
    ("oacute", "\u{F3}", true),
    ("ocirc", "\u{F4}", true),
    ("otilde", "\u{F5}", true),
    ("ouml", "\u{F6}", true),
    ("divide", "\u{F7}", true),
    ("oslash", "\u{F8}", true),
    ("ugrave", "\u{F9}", true),
    ("uacute", "\u{FA}", true),
    ("ucirc", "\u{FB}", true),
    ("uuml", "\u{FC}", true),
    ("yacute", "\u{FD}", true),
    ("thorn", "\u{FE}", true),
    ("yuml", "\u{FF}", true),
    ("amp", "&", true),
    ("AMP", "&", true),
    ("lt", "<", true),
    ("LT", "<", true),
    ("gt", ">", true),
    ("GT", ">", true),
    ("quot", "\u{22}", true),
    ("QUOT", "\u{22}", true),
    ("COPY", "\u{A9}", true),
    ("REG", "\u{AE}", true),
    ("Alpha", "\u{391}", false),
    ("Beta", "\u{392}", false),
    ("Gamma", "\u{393}", false),
    ("Delta", "\u{394}", false),
    ("Epsilon", "\u{395}", false),
    ("Zeta", "\u{396}", false),
    ("Eta", "\u{397}", false),
    ("Theta", "\u{398}", false),
    ("Iota", "\u{399}", false),
    ("Kappa", "\u{39A}", false),
    ("Lambda", "\u{39B}", false),
    ("Mu", "\u{39C}", false),
    ("Nu", "\u{39D}", false),
    ("Xi", "\u{39E}", false),
    ("Omicron", "\u{39F}", false),
    ("Pi", "\u{3A0}", false),
    ("Rho", "\u{3A1}", false),
    ("Sigma", "\u{3A3}", false),
    ("Tau", "\u{3A4}", false),
    ("Upsilon", "\u{3A5}", false),
    ("Phi", "\u{3A6}", false),
    ("Chi", "\u{3A7}", false),
    ("Psi", "\u{3A8}", false),
    ("Omega", "\u{3A9}", false),
    ("alpha", "\u{3B1}", false),
    ("beta", "\u{3B2}", false),
    ("gamma", "\u{3B3}", false),
    ("delta", "\u{3B4}", false),
    ("epsilon", "\u{3B5}", false),
    ("zeta", "\u{3B6}", false),
    ("eta", "\u{3B7}", false),
    ("theta", "\u{3B8}", false),
    ("iota", "\u{3B9}", false),
    ("kappa", "\u{3BA}", false),
    ("lambda", "\u{3BB}", false),
    ("mu", "\u{3BC}", false),
    ("nu", "\u{3BD}", false),
    ("xi", "\u{3BE}", false),
    ("omicron", "\u{3BF}", false),
    ("pi", "\u{3C0}", false),
    ("rho", "\u{3C1}", false),
    ("sigmaf", "\u{3C2}", false),
    ("sigma", "\u{3C3}", false),
    ("tau", "\u{3C4}", false),
    ("upsilon", "\u{3C5}", false),
    ("phi", "\u{3C6}", false),
    ("chi", "\u{3C7}", false),
    ("psi", "\u{3C8}", false),
    ("omega", "\u{3C9}", false),
    ("thetasym", "\u{3D1}", false),
    ("upsih", "\u{3D2}", false),
    ("piv", "\u{3D6}", false),
    ("apos", "'", false),
    ("OElig", "\u{152}", false),
    ("oelig", "\u{153}", false),
    ("Scaron", "\u{160}", false),
    ("scaron", "\u{161}", false),
    ("Yuml", "\u{178}", false),
    ("circ", "\u{2C6}", false),
    ("tilde", "\u{2DC}", false),
    ("ensp", "\u{2002}", false),
    ("emsp", "\u{2003}", false),
    ("thinsp", "\u{2009}", false),
    ("zwnj", "\u{200C}", false),
    ("zwj", "\u{200D}", false),
    ("lrm", "\u{200E}", false),
    ("rlm", "\u{200F}", false),
    ("ndash", "\u{2013}", false),
    ("mdash", "\u{2014}", false),
    ("lsquo", "\u{2018}", false),
    ("rsquo", "\u{2019}", false),
    ("sbquo", "\u{201A}", false),
    ("ldquo", "\u{201C}", false),
    ("rdquo", "\u{201D}", false),
    ("bdquo", "\u{201E}", false),
    ("dagger", "\u{2020}", false),
    ("Dagger", "\u{2021}", false),
    ("permil", "\u{2030}", false),
    ("lsaquo", "\u{2039}", false),
    ("rsaquo", "\u{203A}", false),
    ("euro", "\u{20AC}", false),
    ("fnof", "\u{192}", false),
    ("bull", "\u{2022}", false),
    ("hellip", "\u{2026}", false),
    ("prime", "\u{2032}", false),
    ("Prime", "\u{2033}", false),
    ("oline", "\u{203E}", false),
    ("frasl", "\u{2044}", false),
    ("weierp", "\u{2118}", false),
    ("image", "\u{2111}", false),
    ("real", "\u{211C}", false),
    ("trade", "\u{2122}", false),
    ("alefsym", "\u{2135}", false),
    ("larr", "\u{2190}", false),
    ("uarr", "\u{2191}", false),
    ("rarr", "\u{2192}", false),
    ("darr", "\u{2193}", false),
    ("harr", "\u{2194}", false),
    ("crarr", "\u{21B5}", false),
    ("lArr", "\u{21D0}", false),
    ("uArr", "\u{21D1}", false),
    ("rArr", "\u{21D2}", false),
    ("dArr", "\u{21D3}", false),
    ("hArr", "\u{21D4}", false),
    ("forall", "\u{2200}", false),
    ("part", "\u{2202}", false),
    ("exist", "\u{2203}", false),
    ("empty", "\u{2205}", false),
    ("nabla", "\u{2207}", false),
    ("isin", "\u{2208}", false),
    ("notin", "\u{2209}", false),
    ("ni", "\u{220B}", false),
    ("prod", "\u{220F}", false),
    ("sum", "\u{2211}", false),
    ("minus", "\u{2212}", false),
    ("lowast", "\u{2217}", false),
    ("radic", "\u{221A}", false),
    ("prop", "\u{221D}", false),
    ("infin", "\u{221E}", false),
    ("ang", "\u{2220}", false),
    ("and", "\u{2227}", false),
    ("or", "\u{2228}", false),
    ("cap", "\u{2229}", false),
    ("cup", "\u{222A}", false),
    ("int", "\u{222B}", false),
    ("there4", "\u{2234}", false),
    ("sim", "\u{223C}", false),
    ("cong", "\u{2245}", false),
    ("asymp", "\u{2248}", false),
    ("ne", "\u{2260}", false),
    ("equiv", "\u{2261}", false),
    ("le", "\u{2264}", false),
    ("ge", "\u{2265}", false),
    ("sub", "\u{2282}", false),
    ("sup", "\u{2283}", false),
    ("nsub", "\u{2284}", false),
    ("sube", "\u{2286}", false),
    ("supe", "\u{2287}", false),
    ("oplus", "\u{2295}", false),
    ("otimes", "\u{2297}", false),
    ("perp", "\u{22A5}", false),
    ("sdot", "\u{22C5}", false),
    ("lceil", "\u{2308}", false),
    ("rceil", "\u{2309}", false),
    ("lfloor", "\u{230A}", false),
    ("rfloor", "\u{230B}", false),
    ("lang", "\u{27E8}", false),
    ("rang", "\u{27E9}", false),
    ("loz", "\u{25CA}", false),
    ("spades", "\u{2660}", false),
    ("clubs", "\u{2663}", false),
    ("hearts", "\u{2665}", false),
    ("diams", "\u{2666}", false),
    ("Tab", "\u{9}", false),
    ("NewLine", "\u{A}", false),
    ("excl", "!", false),
    ("num", "#", false),
    ("dollar", "$", false),
    ("percnt", "%", false),
    ("lpar", "(", false),
    ("rpar", ")", false),
    ("ast", "*", false),
    ("plus", "+", false),
    ("comma", ",", false),
    ("period", ".", false),
    ("sol", "/", false),
    ("colon", ":", false),
    ("semi", ";", false),
    ("equals", "=", false),
    ("quest", "?", false),
    ("commat", "@", false),
    ("lsqb", "[", false),
    ("lbrack", "[", false),
    ("bsol", "\u{5C}", false),
    ("rsqb", "]", false),
    ("rbrack", "]", false),
    ("Hat", "^", false),
    ("lowbar", "_", false),
    ("grave", "`", false),
    ("lcub", "{", false),
    ("lbrace", "{", false),
    ("verbar", "|", false),
    ("vert", "|", false),
    ("rcub", "}", false),
    ("rbrace", "}", false),
    ("hyphen", "\u{2010}", false),
    ("dash", "\u{2010}", false),
    ("check", "\u{2713}", false),
    ("cross", "\u{2717}", false),
    ("star", "\u{2606}", false),
    ("starf", "\u{2605}", false),
    ("phone", "\u{260E}", false),
    ("female", "\u{2640}", false),
    ("male", "\u{2642}", false),
    ("sharp", "\u{266F}", false),
    ("flat", "\u{266D}", false),
    ("fjlig", "fj", false),
];

static NAMED_ENTITIES: LazyLock<HashMap<&'static str, (&'static str, bool)>> =
    LazyLock::new(|| {
        ENTITIES
            .iter()
            .map(|&(name, value, legacy)| (name, (value, legacy)))
            .collect()
    });

/// Replacement text for `name` (without `&` or `;`), if it is a known entity.
#[must_use]
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    NAMED_ENTITIES.get(name).map(|&(value, _)| value)
}

/// Whether `name` is a known entity.
#[must_use]
pub fn is_named_entity(name: &str) -> bool {
    NAMED_ENTITIES.contains_key(name)
}

/// Whether `name` is a legacy entity that may omit its semicolon.
#[must_use]
pub fn is_legacy_entity(name: &str) -> bool {
    NAMED_ENTITIES.get(name).is_some_and(|&(_, legacy)| legacy)
}

/// The longest prefix of `name` that is a legacy entity, with its replacement.
///
/// Used when a reference is not followed by `;`: `&notit` resolves to `¬`
/// followed by the literal `it`.
#[must_use]
pub fn longest_legacy_prefix(name: &str) -> Option<(&str, &'static str)> {
    name.char_indices()
        .map(|(i, c)| &name[..i + c.len_utf8()])
        .rev()
        .find_map(|prefix| match NAMED_ENTITIES.get(prefix) {
            Some(&(value, true)) => Some((prefix, value)),
            _ => None,
        })
}
