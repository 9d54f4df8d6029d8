//! GS1 identifier normalizer (spec.md §4.A).
//!
//! Collapses any EPC URI, EPC Class URI, EPC Pattern URI, or GS1 Digital
//! Link URI to a single canonical Digital Link URI rooted at
//! `https://id.gs1.org/`, keeping only the most granular identification
//! level.
//!
//! Organized as a dispatch table keyed by URI family (spec.md §9:
//! "organize [patterns] as a dispatch table ... with each entry pairing
//! a validator and an emitter"), rather than a linear if-chain. Each
//! entry's validator/emitter pair is grounded directly on the
//! corresponding branch of `dl_normaliser.py::normaliser`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Percent-encodes the URL-unsafe characters GS1 Digital Link URIs
/// require escaped in serial/extension segments (spec.md §4.A.4).
fn percent_encode(input: &str) -> String {
	input
		.replace('!', "%21")
		.replace('(', "%28")
		.replace(')', "%29")
		.replace('*', "%2A")
		.replace('+', "%2B")
		.replace(',', "%2C")
		.replace(':', "%3A")
}

/// GS1 standard check digit: Mod-10 with weights 3,1 alternating from
/// the rightmost digit, zeros contributing nothing (spec.md §4.A,
/// "Check-digit algorithm").
pub fn check_digit(key_without_check_digit: &str) -> u8 {
	let digits: Vec<u32> = key_without_check_digit
		.chars()
		.rev()
		.map(|c| c.to_digit(10).unwrap_or(0))
		.collect();
	let sum: u32 = digits
		.iter()
		.enumerate()
		.map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
		.sum();
	let rounded_up = sum.div_ceil(10) * 10;
	((rounded_up - sum) % 10) as u8
}

struct Family {
	validator: &'static Lazy<Regex>,
	emit: fn(&str) -> String,
}

macro_rules! regex_static {
	($name:ident, $pat:expr) => {
		static $name: Lazy<Regex> = Lazy::new(|| Regex::new($pat).unwrap());
	};
}

regex_static!(
	SGTIN_RE,
	r"^urn:epc:id:sgtin:((\d{6}\.\d{7})|(\d{7}\.\d{6})|(\d{8}\.\d{5})|(\d{9}\.\d{4})|(\d{10}\.\d{3})|(\d{11}\.\d{2})|(\d{12}\.\d{1}))\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,20}$"
);

regex_static!(
	SSCC_RE,
	r"^urn:epc:id:sscc:((\d{6}\.\d{11}$)|(\d{7}\.\d{10}$)|(\d{8}\.\d{9}$)|(\d{9}\.\d{8}$)|(\d{10}\.\d{7}$)|(\d{11}\.\d{6}$)|(\d{12}\.\d{5}$))"
);

regex_static!(
	SGLN_RE,
	r"^urn:epc:id:sgln:((\d{6}\.\d{6})|(\d{7}\.\d{5})|(\d{8}\.\d{4})|(\d{9}\.\d{3})|(\d{10}\.\d{2})|(\d{11}\.\d{1})|(\d{12}\.))\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,20}$"
);

regex_static!(
	GRAI_RE,
	r"^urn:epc:id:grai:((\d{6}\.\d{6})|(\d{7}\.\d{5})|(\d{8}\.\d{4})|(\d{9}\.\d{3})|(\d{10}\.\d{2})|(\d{11}\.\d{1})|(\d{12}\.\.))\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,16}$"
);

regex_static!(
	GIAI_RE,
	r"^urn:epc:id:giai:((\d{6}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,24})|(\d{7}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,23})|(\d{8}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,22})|(\d{9}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,21})|(\d{10}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,20})|(\d{11}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,19})|(\d{12}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,18}))$"
);

regex_static!(
	GSRN_RE,
	r"^urn:epc:id:gsrn:((\d{6}\.\d{11}$)|(\d{7}\.\d{10}$)|(\d{8}\.\d{9}$)|(\d{9}\.\d{8}$)|(\d{10}\.\d{7}$)|(\d{11}\.\d{6}$)|(\d{12}\.\d{5}$))"
);

regex_static!(
	GSRNP_RE,
	r"^urn:epc:id:gsrnp:((\d{6}\.\d{11}$)|(\d{7}\.\d{10}$)|(\d{8}\.\d{9}$)|(\d{9}\.\d{8}$)|(\d{10}\.\d{7}$)|(\d{11}\.\d{6}$)|(\d{12}\.\d{5}$))"
);

regex_static!(
	GDTI_RE,
	r"^urn:epc:id:gdti:((\d{6}\.\d{6})|(\d{7}\.\d{5})|(\d{8}\.\d{4})|(\d{9}\.\d{3})|(\d{10}\.\d{2})|(\d{11}\.\d{1})|(\d{12}\.\.))(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,20}$"
);

regex_static!(
	CPI_RE,
	r"^urn:epc:id:cpi:((\d{6}\.(%2[3dfDF]|%3[0-9]|%4[1-9A-Fa-f]|%5[0-9Aa]|[0-9A-Z-]){1,24})|(\d{7}\.(%2[3dfDF]|%3[0-9]|%4[1-9A-Fa-f]|%5[0-9Aa]|[0-9A-Z-]){1,23})|(\d{8}\.(%2[3dfDF]|%3[0-9]|%4[1-9A-Fa-f]|%5[0-9Aa]|[0-9A-Z-]){1,22})|(\d{9}\.(%2[3dfDF]|%3[0-9]|%4[1-9A-Fa-f]|%5[0-9Aa]|[0-9A-Z-]){1,21})|(\d{10}\.(%2[3dfDF]|%3[0-9]|%4[1-9A-Fa-f]|%5[0-9Aa]|[0-9A-Z-]){1,20})|(\d{11}\.(%2[3dfDF]|%3[0-9]|%4[1-9A-Fa-f]|%5[0-9Aa]|[0-9A-Z-]){1,19})|(\d{12}\.(%2[3dfDF]|%3[0-9]|%4[1-9A-Fa-f]|%5[0-9Aa]|[0-9A-Z-]){1,18}))\.\d{1,12}$"
);

regex_static!(
	SGCN_RE,
	r"^urn:epc:id:sgcn:((\d{6}\.\d{6})|(\d{7}\.\d{5})|(\d{8}\.\d{4})|(\d{9}\.\d{3})|(\d{10}\.\d{2})|(\d{11}\.\d{1})|(\d{12}\.))\.\d{1,12}$"
);

regex_static!(
	GINC_RE,
	r"^urn:epc:id:ginc:(\d{6}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,24}|\d{7}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,23}|\d{8}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,22}|\d{9}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,21}|\d{10}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,20}|\d{11}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,19}|\d{12}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,18})$"
);

regex_static!(
	GSIN_RE,
	r"^urn:epc:id:gsin:((\d{6}\.\d{10}$)|(\d{7}\.\d{9}$)|(\d{8}\.\d{8}$)|(\d{9}\.\d{7}$)|(\d{10}\.\d{6}$)|(\d{11}\.\d{5}$)|(\d{12}\.\d{4}$))"
);

regex_static!(
	ITIP_RE,
	r"^urn:epc:id:itip:((\d{6}\.\d{7})|(\d{7}\.\d{6})|(\d{8}\.\d{5})|(\d{9}\.\d{4})|(\d{10}\.\d{3})|(\d{11}\.\d{2})|(\d{12}\.\d{1}))\.\d{2}\.\d{2}\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,20}$"
);

regex_static!(
	UPUI_RE,
	r"^urn:epc:id:upui:((\d{6}\.\d{7})|(\d{7}\.\d{6})|(\d{8}\.\d{5})|(\d{9}\.\d{4})|(\d{10}\.\d{3})|(\d{11}\.\d{2})|(\d{12}\.\d{1}))\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,28}$"
);

regex_static!(
	PGLN_RE,
	r"^urn:epc:id:pgln:((\d{6}\.\d{6})|(\d{7}\.\d{5})|(\d{8}\.\d{4})|(\d{9}\.\d{3})|(\d{10}\.\d{2})|(\d{11}\.\d{1})|(\d{12}\.))$"
);

regex_static!(
	LGTIN_RE,
	r"^urn:epc:class:lgtin:((\d{6}\.\d{7})|(\d{7}\.\d{6})|(\d{8}\.\d{5})|(\d{9}\.\d{4})|(\d{10}\.\d{3})|(\d{11}\.\d{2})|(\d{12}\.\d{1}))\.(%2[125-9A-Fa-f]|%3[0-9A-Fa-f]|%4[1-9A-Fa-f]|%5[0-9AaFf]|%6[1-9A-Fa-f]|%7[0-9Aa]|[!')(*+,.0-9:;=A-Za-z_-]){1,20}$"
);

regex_static!(
	SGTIN_PAT_RE,
	r"^urn:epc:idpat:sgtin:((\d{6}\.\d{7})|(\d{7}\.\d{6})|(\d{8}\.\d{5})|(\d{9}\.\d{4})|(\d{10}\.\d{3})|(\d{11}\.\d{2})|(\d{12}\.\d{1}))\.\*$"
);

regex_static!(
	GRAI_PAT_RE,
	r"^urn:epc:idpat:grai:((\d{6}\.\d{6})|(\d{7}\.\d{5})|(\d{8}\.\d{4})|(\d{9}\.\d{3})|(\d{10}\.\d{2})|(\d{11}\.\d{1})|(\d{12}\.\.))\.\*$"
);

regex_static!(
	GDTI_PAT_RE,
	r"^urn:epc:idpat:gdti:((\d{6}\.\d{6})|(\d{7}\.\d{5})|(\d{8}\.\d{4})|(\d{9}\.\d{3})|(\d{10}\.\d{2})|(\d{11}\.\d{1})|(\d{12}\.\.))\.\*$"
);

regex_static!(
	SGCN_PAT_RE,
	r"^urn:epc:idpat:sgcn:((\d{6}\.\d{6})|(\d{7}\.\d{5})|(\d{8}\.\d{4})|(\d{9}\.\d{3})|(\d{10}\.\d{2})|(\d{11}\.\d{1})|(\d{12}\.\.))\.\*$"
);

regex_static!(
	CPI_PAT_RE,
	r"^urn:epc:idpat:cpi:((\d{6}\.(%2[3dfDF]|%3[0-9]|%4[1-9A-Fa-f]|%5[0-9Aa]|[0-9A-Z-]){1,24})|(\d{7}\.(%2[3dfDF]|%3[0-9]|%4[1-9A-Fa-f]|%5[0-9Aa]|[0-9A-Z-]){1,23})|(\d{8}\.(%2[3dfDF]|%3[0-9]|%4[1-9A-Fa-f]|%5[0-9Aa]|[0-9A-Z-]){1,22})|(\d{9}\.(%2[3dfDF]|%3[0-9]|%4[1-9A-Fa-f]|%5[0-9Aa]|[0-9A-Z-]){1,21})|(\d{10}\.(%2[3dfDF]|%3[0-9]|%4[1-9A-Fa-f]|%5[0-9Aa]|[0-9A-Z-]){1,20})|(\d{11}\.(%2[3dfDF]|%3[0-9]|%4[1-9A-Fa-f]|%5[0-9Aa]|[0-9A-Z-]){1,19})|(\d{12}\.(%2[3dfDF]|%3[0-9]|%4[1-9A-Fa-f]|%5[0-9Aa]|[0-9A-Z-]){1,18}))\.\*$"
);

regex_static!(
	ITIP_PAT_RE,
	r"^urn:epc:idpat:itip:((\d{6}\.\d{7})|(\d{7}\.\d{6})|(\d{8}\.\d{5})|(\d{9}\.\d{4})|(\d{10}\.\d{3})|(\d{11}\.\d{2})|(\d{12}\.\d{1}))\.\d{2}\.\d{2}\.\*$"
);

regex_static!(
	UPUI_PAT_RE,
	r"^urn:epc:idpat:upui:((\d{6}\.\d{7})|(\d{7}\.\d{6})|(\d{8}\.\d{5})|(\d{9}\.\d{4})|(\d{10}\.\d{3})|(\d{11}\.\d{2})|(\d{12}\.\d{1}))\.\*$"
);

regex_static!(
	DL_RE,
	r"^https?://(?:(?:[^/?#]*@)?[^/?#:]*(?::[^/?#]*)?)?(?:([^?#]*)(?:/(?:01|gtin|8006|itip|8010|cpid|414|gln|417|party|8017|gsrnp|8018|gsrn|255|gcn|00|sscc|253|gdti|401|ginc|402|gsin|8003|grai|8004|giai)/)(\d{4}[^/]+)(?:/[^/]+/[^/]+)?/?(?:\?[^?\n]*)?(?:#[^\n]*)?|/[A-Za-z_-]{10}$)"
);

fn partition_index(uri: &str) -> Option<usize> {
	uri.find('.')
}

fn emit_sgtin(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[17..p];
	let itemref = &uri[p + 1..p + 1 + (13 - gcp.len())];
	let raw_gtin = format!("{}{}{}", &itemref[0..1], gcp, &itemref[1..]);
	let serial = &uri[32..];
	format!(
		"https://id.gs1.org/01/{}{}/21/{}",
		raw_gtin,
		check_digit(&raw_gtin),
		percent_encode(serial)
	)
}

fn emit_sscc(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[16..p];
	let extension_digit = &uri[p + 1..p + 2];
	let serialref = &uri[p + 2..];
	let raw_sscc = format!("{}{}{}", extension_digit, gcp, serialref);
	format!("https://id.gs1.org/00/{}{}", raw_sscc, check_digit(&raw_sscc))
}

fn emit_sgln(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[16..p];
	let locationref = &uri[p + 1..p + 1 + (12 - gcp.len())];
	let raw_gln = format!("{}{}", gcp, locationref);
	let extension = &uri[30..];
	if extension == "0" {
		format!("https://id.gs1.org/414/{}{}", raw_gln, check_digit(&raw_gln))
	} else {
		format!(
			"https://id.gs1.org/414/{}{}/254/{}",
			raw_gln,
			check_digit(&raw_gln),
			percent_encode(extension)
		)
	}
}

fn emit_grai(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[16..p];
	let assetref = &uri[p + 1..p + 1 + (12 - gcp.len())];
	let raw_grai = format!("0{}{}", gcp, assetref);
	let serial = &uri[30..];
	format!(
		"https://id.gs1.org/8003/{}{}{}",
		raw_grai,
		check_digit(&raw_grai),
		percent_encode(serial)
	)
}

fn emit_giai(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[16..p];
	let assetref = &uri[p + 1..];
	format!("https://id.gs1.org/8004/{}{}", gcp, percent_encode(assetref))
}

fn emit_gsrn(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[16..p];
	let serviceref = &uri[p + 1..];
	let raw = format!("{}{}", gcp, serviceref);
	format!("https://id.gs1.org/8018/{}{}", raw, check_digit(&raw))
}

fn emit_gsrnp(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[17..p];
	let serviceref = &uri[p + 1..];
	let raw = format!("{}{}", gcp, serviceref);
	format!("https://id.gs1.org/8017/{}{}", raw, check_digit(&raw))
}

fn emit_gdti(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[16..p];
	let documenttype = &uri[p + 1..p + 1 + (12 - gcp.len())];
	let raw_gdti = format!("{}{}", gcp, documenttype);
	let serial = &uri[30..];
	format!(
		"https://id.gs1.org/253/{}{}{}",
		raw_gdti,
		check_digit(&raw_gdti),
		percent_encode(serial)
	)
}

fn emit_cpi(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[15..p];
	let separator = uri.rfind('.').unwrap();
	let cpref = &uri[p + 1..separator];
	let raw_cpi = format!("{}{}", gcp, cpref);
	let serial = &uri[separator + 1..];
	format!(
		"https://id.gs1.org/8010/{}/8011/{}",
		percent_encode(&raw_cpi),
		serial
	)
}

fn emit_sgcn(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[16..p];
	let couponref = &uri[p + 1..p + 1 + (12 - gcp.len())];
	let raw_sgcn = format!("{}{}", gcp, couponref);
	let serial = &uri[30..];
	format!(
		"https://id.gs1.org/255/{}{}{}",
		raw_sgcn,
		check_digit(&raw_sgcn),
		serial
	)
}

fn emit_ginc(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[16..p];
	let consignmentref = &uri[p + 1..];
	format!(
		"https://id.gs1.org/401/{}{}",
		gcp,
		percent_encode(consignmentref)
	)
}

fn emit_gsin(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[16..p];
	let shipperref = &uri[p + 1..];
	let raw = format!("{}{}", gcp, shipperref);
	format!("https://id.gs1.org/402/{}{}", raw, check_digit(&raw))
}

fn emit_itip(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[16..p];
	let itemref = &uri[p + 1..p + 1 + (13 - gcp.len())];
	let raw_gtin = format!("{}{}{}", &itemref[0..1], gcp, &itemref[1..]);
	let piece = &uri[31..33];
	let total = &uri[34..36];
	let serial = &uri[37..];
	format!(
		"https://id.gs1.org/8006/{}{}{}{}/21/{}",
		raw_gtin,
		check_digit(&raw_gtin),
		piece,
		total,
		percent_encode(serial)
	)
}

fn emit_upui(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[16..p];
	let itemref = &uri[p + 1..p + 1 + (13 - gcp.len())];
	let raw_gtin = format!("{}{}{}", &itemref[0..1], gcp, &itemref[1..]);
	let serial = &uri[31..];
	format!(
		"https://id.gs1.org/01/{}{}/235/{}",
		raw_gtin,
		check_digit(&raw_gtin),
		percent_encode(serial)
	)
}

fn emit_pgln(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[16..p];
	let partyref = &uri[p + 1..p + 1 + (12 - gcp.len())];
	let raw_gln = format!("{}{}", gcp, partyref);
	format!("https://id.gs1.org/417/{}{}", raw_gln, check_digit(&raw_gln))
}

fn emit_lgtin(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[20..p];
	let itemref = &uri[p + 1..p + 1 + (13 - gcp.len())];
	let raw_gtin = format!("{}{}{}", &itemref[0..1], gcp, &itemref[1..]);
	let lot = &uri[35..];
	format!(
		"https://id.gs1.org/01/{}{}/10/{}",
		raw_gtin,
		check_digit(&raw_gtin),
		percent_encode(lot)
	)
}

fn emit_sgtin_pat(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[20..p];
	let itemref = &uri[p + 1..p + 1 + (13 - gcp.len())];
	let raw_gtin = format!("{}{}{}", &itemref[0..1], gcp, &itemref[1..]);
	format!("https://id.gs1.org/01/{}{}", raw_gtin, check_digit(&raw_gtin))
}

fn emit_grai_pat(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[19..p];
	let assetref = &uri[p + 1..p + 1 + (12 - gcp.len())];
	let raw_grai = format!("0{}{}", gcp, assetref);
	format!(
		"https://id.gs1.org/8003/{}{}",
		raw_grai,
		check_digit(&raw_grai)
	)
}

fn emit_gdti_pat(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[19..p];
	let documenttype = &uri[p + 1..p + 1 + (12 - gcp.len())];
	let raw_gdti = format!("{}{}", gcp, documenttype);
	format!(
		"https://id.gs1.org/253/{}{}",
		raw_gdti,
		check_digit(&raw_gdti)
	)
}

fn emit_sgcn_pat(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[19..p];
	let couponref = &uri[p + 1..p + 1 + (12 - gcp.len())];
	let raw_sgcn = format!("{}{}", gcp, couponref);
	format!(
		"https://id.gs1.org/255/{}{}",
		raw_sgcn,
		check_digit(&raw_sgcn)
	)
}

fn emit_cpi_pat(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[18..p];
	let separator = uri.rfind('.').unwrap();
	let cpref = &uri[p + 1..separator];
	let raw_cpi = format!("{}{}", gcp, cpref);
	format!("https://id.gs1.org/8010/{}", percent_encode(&raw_cpi))
}

fn emit_itip_pat(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[19..p];
	let itemref = &uri[p + 1..p + 1 + (13 - gcp.len())];
	let raw_gtin = format!("{}{}{}", &itemref[0..1], gcp, &itemref[1..]);
	let piece = &uri[34..36];
	let total = &uri[37..39];
	format!(
		"https://id.gs1.org/8006/{}{}{}{}",
		raw_gtin,
		check_digit(&raw_gtin),
		piece,
		total
	)
}

fn emit_upui_pat(uri: &str) -> String {
	let p = partition_index(uri).unwrap();
	let gcp = &uri[19..p];
	let itemref = &uri[p + 1..p + 1 + (13 - gcp.len())];
	let raw_gtin = format!("{}{}{}", &itemref[0..1], gcp, &itemref[1..]);
	format!("https://id.gs1.org/01/{}{}", raw_gtin, check_digit(&raw_gtin))
}

const FAMILIES: &[Family] = &[
	Family { validator: &SGTIN_RE, emit: emit_sgtin },
	Family { validator: &SSCC_RE, emit: emit_sscc },
	Family { validator: &SGLN_RE, emit: emit_sgln },
	Family { validator: &GRAI_RE, emit: emit_grai },
	Family { validator: &GIAI_RE, emit: emit_giai },
	Family { validator: &GSRN_RE, emit: emit_gsrn },
	Family { validator: &GSRNP_RE, emit: emit_gsrnp },
	Family { validator: &GDTI_RE, emit: emit_gdti },
	Family { validator: &CPI_RE, emit: emit_cpi },
	Family { validator: &SGCN_RE, emit: emit_sgcn },
	Family { validator: &GINC_RE, emit: emit_ginc },
	Family { validator: &GSIN_RE, emit: emit_gsin },
	Family { validator: &ITIP_RE, emit: emit_itip },
	Family { validator: &UPUI_RE, emit: emit_upui },
	Family { validator: &PGLN_RE, emit: emit_pgln },
	Family { validator: &LGTIN_RE, emit: emit_lgtin },
	Family { validator: &SGTIN_PAT_RE, emit: emit_sgtin_pat },
	Family { validator: &GRAI_PAT_RE, emit: emit_grai_pat },
	Family { validator: &GDTI_PAT_RE, emit: emit_gdti_pat },
	Family { validator: &SGCN_PAT_RE, emit: emit_sgcn_pat },
	Family { validator: &CPI_PAT_RE, emit: emit_cpi_pat },
	Family { validator: &ITIP_PAT_RE, emit: emit_itip_pat },
	Family { validator: &UPUI_PAT_RE, emit: emit_upui_pat },
];

const SHORT_NAME_TO_AI: &[(&str, &str)] = &[
	("/gtin/", "/01/"),
	("/itip/", "/8006/"),
	("/cpid/", "/8010/"),
	("/gln/", "/414/"),
	("/party/", "/417/"),
	("/gsrnp/", "/8017/"),
	("/gsrn/", "/8018/"),
	("/gcn/", "/255/"),
	("/sscc/", "/00/"),
	("/gdti/", "/253/"),
	("/ginc/", "/401/"),
	("/gsin/", "/402/"),
	("/grai/", "/8003/"),
	("/giai/", "/8004/"),
	("/cpv/", "/22/"),
	("/lot/", "/10/"),
	("/ser/", "/21/"),
];

const CANONICAL_AIS: &[&str] = &[
	"/00/", "/01/", "/253/", "/255/", "/401/", "/402/", "/414/", "/417/", "/8003/", "/8004/",
	"/8006/", "/8010/", "/8017/", "/8018/",
];

regex_static!(GTIN14_RE, r"^https://id\.gs1\.org/01/\d{14}");
regex_static!(GTIN13_RE, r"^https://id\.gs1\.org/01/\d{13}");
regex_static!(GTIN12_RE, r"^https://id\.gs1\.org/01/\d{12}");
regex_static!(GTIN8_RE, r"^https://id\.gs1\.org/01/\d{8}");

regex_static!(
	LOT_THEN_SERIAL_RE,
	r#"^https://id\.gs1\.org/(?:8006/\d{18}|01/\d{14})/10/["'\-.0-9;-?A-Z_a-z]{0,20}/21/["'\-.0-9;-?A-Z_a-z]{0,20}$"#
);

regex_static!(
	VALID_OUTPUT_RE,
	r#"^(https://id\.gs1\.org/00/\d{18}$|https://id\.gs1\.org/01/\d{14}/21/["'\-.0-9;-?A-Z_a-z]{0,20}$|https://id\.gs1\.org/01/\d{14}/10/["'\-.0-9;-?A-Z_a-z]{0,20}$|https://id\.gs1\.org/01/\d{14}$|https://id\.gs1\.org/01/\d{14}/235/["'\-.0-9;-?A-Z_a-z]{0,28}$|https://id\.gs1\.org/253/\d{13}["'\-.0-9;-?A-Z_a-z]{0,17}$|https://id\.gs1\.org/255/\d{13}\d{0,12}$|https://id\.gs1\.org/401/["'\-.0-9;-?A-Z_a-z]{0,30}$|https://id\.gs1\.org/402/\d{17}$|https://id\.gs1\.org/414/\d{13}$|https://id\.gs1\.org/414/\d{13}/254/["'\-.0-9;-?A-Z_a-z]{0,20}$|https://id\.gs1\.org/417/\d{13}$|https://id\.gs1\.org/8003/\d{14}["'\-.0-9;-?A-Z_a-z]{0,16}$|https://id\.gs1\.org/8004/["'\-.0-9;-?A-Z_a-z]{0,30}$|https://id\.gs1\.org/8006/\d{18}/21/["'\-.0-9;-?A-Z_a-z]{0,20}$|https://id\.gs1\.org/8006/\d{18}/10/["'\-.0-9;-?A-Z_a-z]{0,20}$|https://id\.gs1\.org/8006/\d{18}$|https://id\.gs1\.org/8010/[#\-/0-9A-Z]{0,30}/8011/\d{0,12}$|https://id\.gs1\.org/8010/[#\-/0-9A-Z]{0,30}$|https://id\.gs1\.org/8017/\d{18}$|https://id\.gs1\.org/8018/\d{18}$)"#
);

/// Converts any EPC URI, EPC Class URI, EPC Pattern URI, or GS1 Digital
/// Link URI into its canonical Digital Link form. Returns `None` when
/// `uri` is not a recognizable GS1 identifier — the caller keeps the
/// original value in that case (spec.md §4.A, "never errors").
pub fn normalize(uri: &str) -> Option<String> {
	if !uri.contains('.') {
		return None;
	}
	for family in FAMILIES {
		if family.validator.is_match(uri) {
			return Some((family.emit)(uri));
		}
	}
	normalize_digital_link(uri)
}

fn normalize_digital_link(uri: &str) -> Option<String> {
	if !DL_RE.is_match(uri) {
		return None;
	}

	let mut uri = match uri.find('?') {
		Some(idx) => uri[..idx].to_string(),
		None => uri.to_string(),
	};

	for (short, ai) in SHORT_NAME_TO_AI {
		uri = uri.replace(short, ai);
	}

	if !CANONICAL_AIS.iter().any(|ai| uri.contains(ai)) {
		return None;
	}
	if !uri.starts_with("https://id.gs1.org/") {
		if let Some(pos) = CANONICAL_AIS.iter().find_map(|ai| uri.find(ai)) {
			uri = format!("https://id.gs1.org{}", &uri[pos..]);
		}
	}

	if !GTIN14_RE.is_match(&uri) {
		if GTIN13_RE.is_match(&uri) {
			uri = uri.replacen("/01/", "/01/0", 1);
		} else if GTIN12_RE.is_match(&uri) {
			uri = uri.replacen("/01/", "/01/00", 1);
		} else if GTIN8_RE.is_match(&uri) {
			uri = uri.replacen("/01/", "/01/000000", 1);
		}
	}

	if let Some(cpv_pos) = uri.find("/22/") {
		let tail = uri[cpv_pos + 4..].to_string();
		let next_slash = tail.find('/');
		uri = match next_slash {
			Some(slash) => format!("{}{}", &uri[..cpv_pos], &tail[slash..]),
			None => uri[..cpv_pos].to_string(),
		};
	}

	if LOT_THEN_SERIAL_RE.is_match(&uri) {
		let lot_pos = uri.find("/10/").unwrap();
		let after_lot = uri[lot_pos + 4..].to_string();
		if let Some(slash) = after_lot.find('/') {
			uri = format!("{}{}", &uri[..lot_pos], &after_lot[slash..]);
		}
	}

	if VALID_OUTPUT_RE.is_match(&uri) {
		Some(uri)
	} else {
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn check_digit_known_values() {
		assert_eq!(check_digit("0401234511111"), 8);
	}

	#[test]
	fn sgtin_to_digital_link() {
		let out = normalize("urn:epc:id:sgtin:4012345.011111.987").unwrap();
		assert_eq!(out, "https://id.gs1.org/01/04012345111118/21/987");
	}

	#[test]
	fn sscc_to_digital_link() {
		let out = normalize("urn:epc:id:sscc:0614141.1234567890").unwrap();
		assert!(out.starts_with("https://id.gs1.org/00/"));
	}

	#[test]
	fn lgtin_emits_lot_ai() {
		let out = normalize("urn:epc:class:lgtin:4012345.011111.LOT42").unwrap();
		assert!(out.contains("/10/LOT42"));
	}

	#[test]
	fn pattern_uri_has_no_serial() {
		let out = normalize("urn:epc:idpat:sgtin:4012345.011111.*").unwrap();
		assert_eq!(out, "https://id.gs1.org/01/04012345111118");
	}

	#[test]
	fn non_gs1_string_returns_none() {
		assert_eq!(normalize("not a gs1 identifier"), None);
		assert_eq!(normalize("no-dot-here"), None);
	}

	#[test]
	fn digital_link_canonicalizes_domain_and_pads_gtin() {
		let out = normalize("https://example.org/01/9780345418913/21/765tz?11=221109").unwrap();
		assert_eq!(out, "https://id.gs1.org/01/09780345418913/21/765tz");
	}
}
