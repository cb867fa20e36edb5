use contentcodec::richtext;
use contentcodec_cli::{ValidationContext, parse_json, read_input, to_pretty_json, validate_context};
use serde_json::Value;

/// Print the HTML of a block tree.
pub fn run_to_html(input: Option<&str>) -> Result<(), String> {
    validate_context(&ValidationContext::new().with_input_file(input))?;

    let blocks: Value = parse_json(&read_input(input)?)?;
    if !blocks.is_array() {
        return Err("Expected a JSON array of blocks".to_string());
    }
    println!("{}", richtext::encode_value(&blocks));
    Ok(())
}

/// Print the block tree of an HTML fragment.
pub fn run_to_blocks(input: Option<&str>) -> Result<(), String> {
    validate_context(&ValidationContext::new().with_input_file(input))?;

    let html = read_input(input)?;
    println!("{}", to_pretty_json(&richtext::decode(html.trim_end()))?);
    Ok(())
}
