//! AFM advance widths for the standard Helvetica fonts.
//!
//! Widths are in 1/1000 of the font size, indexed from U+0020. Characters
//! outside ASCII fold onto their unaccented base letter before lookup, with
//! explicit entries for the Latin-1 punctuation and the i-acute family
//! (whose AFM width differs from the dotted base letter).

/// Advance widths for one standard font.
pub struct StandardFontMetrics {
    /// Widths for U+0020 ..= U+007E.
    ascii: [u16; 95],
    /// Fallback for characters with no table entry.
    default_width: u16,
    /// Width of the accented i family (iacute, igrave, icircumflex,
    /// idieresis): wider than the base 'i' in Helvetica.
    accented_i: u16,
    /// questiondown / exclamdown.
    questiondown: u16,
    exclamdown: u16,
}

impl StandardFontMetrics {
    /// Advance width of `ch` scaled to `font_size`.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        (self.unit_width(ch) as f64 / 1000.0) * font_size
    }

    /// Sum of advance widths for `text` scaled to `font_size`.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }

    fn unit_width(&self, ch: char) -> u16 {
        let code = ch as u32;
        if (0x20..=0x7E).contains(&code) {
            return self.ascii[(code - 0x20) as usize];
        }
        match ch {
            'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => self.accented_i,
            '¿' => self.questiondown,
            '¡' => self.exclamdown,
            _ => match fold_accent(ch) {
                Some(base) => self.ascii[(base as u32 - 0x20) as usize],
                None => self.default_width,
            },
        }
    }
}

/// Map common Latin-1 accented letters to their base letter for width lookup.
fn fold_accent(ch: char) -> Option<char> {
    let folded = match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'A',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'Ñ' => 'N',
        'Ç' => 'C',
        _ => return None,
    };
    Some(folded)
}

/// Helvetica (upright and oblique).
pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    ascii: [
        278, 278, 355, 556, 556, 889, 667, 191, // space ! " # $ % & '
        333, 333, 389, 584, 278, 333, 278, 278, // ( ) * + , - . /
        556, 556, 556, 556, 556, 556, 556, 556, // 0 1 2 3 4 5 6 7
        556, 556, 278, 278, 584, 584, 584, 556, // 8 9 : ; < = > ?
        1015, 667, 667, 722, 722, 667, 611, 778, // @ A B C D E F G
        722, 278, 500, 667, 556, 833, 722, 778, // H I J K L M N O
        667, 778, 722, 667, 611, 722, 667, 944, // P Q R S T U V W
        667, 667, 611, 278, 278, 278, 469, 556, // X Y Z [ \ ] ^ _
        333, 556, 556, 500, 556, 556, 278, 556, // ` a b c d e f g
        556, 222, 222, 500, 222, 833, 556, 556, // h i j k l m n o
        556, 556, 333, 500, 278, 556, 500, 722, // p q r s t u v w
        500, 500, 500, 334, 260, 334, 584, // x y z { | } ~
    ],
    default_width: 556,
    accented_i: 278,
    questiondown: 611,
    exclamdown: 333,
};

/// Helvetica-Bold (and bold oblique).
pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    ascii: [
        278, 333, 474, 556, 556, 889, 722, 238, // space ! " # $ % & '
        333, 333, 389, 584, 278, 333, 278, 278, // ( ) * + , - . /
        556, 556, 556, 556, 556, 556, 556, 556, // 0 1 2 3 4 5 6 7
        556, 556, 333, 333, 584, 584, 584, 611, // 8 9 : ; < = > ?
        975, 722, 722, 722, 722, 667, 611, 778, // @ A B C D E F G
        722, 278, 556, 722, 611, 833, 722, 778, // H I J K L M N O
        667, 778, 722, 667, 611, 722, 667, 944, // P Q R S T U V W
        667, 667, 611, 333, 278, 333, 584, 556, // X Y Z [ \ ] ^ _
        333, 556, 611, 556, 611, 556, 333, 611, // ` a b c d e f g
        611, 278, 278, 556, 278, 889, 611, 611, // h i j k l m n o
        611, 611, 389, 556, 333, 611, 556, 778, // p q r s t u v w
        556, 556, 500, 389, 280, 389, 584, // x y z { | } ~
    ],
    default_width: 611,
    accented_i: 278,
    questiondown: 611,
    exclamdown: 333,
};
