/// Primitive number parsers over raw byte spans
use nom::{
    character::complete::i32 as signed_int,
    combinator::all_consuming,
    number::complete::float,
    IResult,
};

/// Field separator inside a record: space or tab.
#[inline]
pub fn is_blank(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// Split a record body into its whitespace-separated fields.
pub fn fields(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    data.split(|&b| is_blank(b)).filter(|field| !field.is_empty())
}

/// Parse a whole field as a decimal float (`1`, `-0.5`, `2.5e-3`).
///
/// Culture-invariant: the decimal separator is always `.`. `inf` and `nan`
/// spellings are not numbers here.
pub fn parse_float(field: &[u8]) -> Option<f32> {
    finish(all_consuming(float)(field)).filter(|value: &f32| value.is_finite())
}

/// Parse a whole field as a signed 32-bit integer.
pub fn parse_int(field: &[u8]) -> Option<i32> {
    finish(all_consuming(signed_int)(field))
}

/// Convert a 1-based OBJ index to 0-based. Non-positive values pass through
/// unchanged (relative indices are not resolved here).
#[inline]
pub fn adjust_index(index: i32) -> i32 {
    if index > 0 {
        index - 1
    } else {
        index
    }
}

/// Parse up to `N` leading float fields into `out`.
///
/// Returns how many fields were stored, or `None` as soon as one of them is
/// not a number. Fields past `N` are not inspected.
pub fn parse_float_fields<const N: usize>(data: &[u8], out: &mut [f32; N]) -> Option<usize> {
    let mut count = 0;
    for (slot, field) in out.iter_mut().zip(fields(data)) {
        *slot = parse_float(field)?;
        count += 1;
    }
    Some(count)
}

fn finish<O>(result: IResult<&[u8], O>) -> Option<O> {
    result.ok().map(|(_, value)| value)
}
