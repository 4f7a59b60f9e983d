//! Built-in retrieval functions.
//!
//! Each function takes no arguments and produces a [`Retrieved`]: the table,
//! plus the metadata record to persist when the dataset needs reconstruction
//! hints. Network retrievers fetch pinned static files over HTTPS and fail
//! with an error on any non-success status — no retry at this layer.

use crate::dataset::Dataset;
use crate::error::DataError;
use crate::metadata::MetaRecord;
use crate::registry::Retrieved;
use polars::prelude::*;
use std::io::Cursor;
use std::time::Duration;

const GOODBOOKS_BASE: &str =
    "https://raw.githubusercontent.com/zygmuntz/goodbooks-10k/c8a6e0a9a3b620c3f89301b0b3dc2a6653972294";

/// US state FIPS codes, abbreviations, and names.
const STATE_FIPS_CSV: &str = "\
FIPS,Abbreviation,Name
2,AK,Alaska
28,MS,Mississippi
1,AL,Alabama
30,MT,Montana
5,AR,Arkansas
37,NC,North Carolina
38,ND,North Dakota
4,AZ,Arizona
31,NE,Nebraska
6,CA,California
33,NH,New Hampshire
8,CO,Colorado
34,NJ,New Jersey
9,CT,Connecticut
35,NM,New Mexico
32,NV,Nevada
10,DE,Delaware
36,NY,New York
12,FL,Florida
39,OH,Ohio
13,GA,Georgia
40,OK,Oklahoma
41,OR,Oregon
15,HI,Hawaii
42,PA,Pennsylvania
19,IA,Iowa
16,ID,Idaho
44,RI,Rhode Island
17,IL,Illinois
45,SC,South Carolina
18,IN,Indiana
46,SD,South Dakota
20,KS,Kansas
47,TN,Tennessee
21,KY,Kentucky
48,TX,Texas
22,LA,Louisiana
49,UT,Utah
25,MA,Massachusetts
51,VA,Virginia
24,MD,Maryland
23,ME,Maine
50,VT,Vermont
26,MI,Michigan
53,WA,Washington
27,MN,Minnesota
55,WI,Wisconsin
29,MO,Missouri
54,WV,West Virginia
56,WY,Wyoming
";

/// Fixed 3x3 integer table used to exercise the cache end to end.
pub fn test() -> Result<Retrieved, DataError> {
    let frame = df!(
        "A" => [0i64, 1, 2],
        "B" => [3i64, 4, 5],
        "C" => [6i64, 7, 8],
    )
    .map_err(|e| DataError::Codec(format!("build test frame: {e}")))?;
    Ok(Retrieved::plain(Dataset::new(frame)))
}

/// US state FIPS table, embedded in the binary.
pub fn state_fips() -> Result<Retrieved, DataError> {
    let frame = csv_from_bytes(STATE_FIPS_CSV.as_bytes().to_vec(), b',')?;
    Ok(Retrieved::plain(Dataset::new(frame)))
}

pub fn goodreads_books() -> Result<Retrieved, DataError> {
    remote_csv(&format!("{GOODBOOKS_BASE}/books.csv"), b',')
}

pub fn goodreads_ratings() -> Result<Retrieved, DataError> {
    remote_csv(&format!("{GOODBOOKS_BASE}/ratings.csv"), b',')
}

pub fn goodreads_tags() -> Result<Retrieved, DataError> {
    remote_csv(&format!("{GOODBOOKS_BASE}/tags.csv"), b',')
}

pub fn goodreads_book_tags() -> Result<Retrieved, DataError> {
    remote_csv(&format!("{GOODBOOKS_BASE}/book_tags.csv"), b',')
}

/// IATA carrier code lookup table, indexed by the `Code` column.
pub fn airline_carrier_codes() -> Result<Retrieved, DataError> {
    let url = "https://s3.us-east-2.amazonaws.com/valorum-materials/data/Carrier_Codes.csv";
    let frame = csv_from_bytes(http_get(url)?, b',')?;
    let dataset = Dataset::with_index(frame, vec!["Code".to_string()])?;
    Ok(Retrieved {
        dataset,
        metadata: Some(MetaRecord {
            parse_dates: vec![],
            index: vec!["Code".to_string()],
        }),
    })
}

/// Chipotle order data, tab-separated.
pub fn chipotle_raw() -> Result<Retrieved, DataError> {
    let url = "https://raw.githubusercontent.com/TheUpshot/chipotle/master/orders.tsv";
    remote_csv(url, b'\t')
}

fn remote_csv(url: &str, separator: u8) -> Result<Retrieved, DataError> {
    let frame = csv_from_bytes(http_get(url)?, separator)?;
    Ok(Retrieved::plain(Dataset::new(frame)))
}

/// Blocking GET returning the response body, with status codes mapped into
/// the error taxonomy.
fn http_get(url: &str) -> Result<Vec<u8>, DataError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .map_err(|e| DataError::Transport(format!("build HTTP client: {e}")))?;

    let resp = client
        .get(url)
        .send()
        .map_err(|e| DataError::Transport(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(DataError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    resp.bytes()
        .map(|b| b.to_vec())
        .map_err(|e| DataError::Transport(e.to_string()))
}

fn csv_from_bytes(bytes: Vec<u8>, separator: u8) -> Result<DataFrame, DataError> {
    CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|opts| opts.with_separator(separator))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| DataError::Codec(format!("parse retrieved csv: {e}")))
}
