use kagi_credential::KeyMaterial;
use kagi_pem::ToPem;

use crate::output::KeyFormat;

/// Print key material to stdout in `format`.
pub(crate) fn print_key(key: &KeyMaterial, format: KeyFormat) {
    match format {
        KeyFormat::Pem => {
            let pem = match key.to_pem() {
                Ok(pem) => pem,
                Err(never) => match never {},
            };
            println!("{}", pem);
        }
        KeyFormat::Hex => print!("{}", format_hex_dump(key.as_bytes())),
    }
}

/// Format binary data as hexadecimal dump
///
/// Returns a string formatted in hexdump style (similar to `xxd` command):
/// - 16 bytes per line
/// - Offset in hexadecimal
/// - Hex bytes with space separator
/// - ASCII representation on the right
pub(crate) fn format_hex_dump(data: &[u8]) -> String {
    const BYTES_PER_LINE: usize = 16;
    let mut output = String::new();

    for (offset, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        output.push_str(&format!("{:08x}  ", offset * BYTES_PER_LINE));

        for (i, byte) in chunk.iter().enumerate() {
            output.push_str(&format!("{:02x} ", byte));
            if i == 7 {
                output.push(' ');
            }
        }

        // pad a short last line so the ASCII column lines up
        for i in chunk.len()..BYTES_PER_LINE {
            output.push_str("   ");
            if i == 7 {
                output.push(' ');
            }
        }

        output.push_str(" |");
        output.extend(chunk.iter().map(|&byte| {
            if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '.'
            }
        }));
        output.push_str("|\n");
    }

    output
}
