//! End-to-end coverage of spec.md §8's testable properties and concrete
//! scenarios (S1-S6): parse -> canonicalize -> hash, through the public
//! `canon::pipeline` entry points only.

#[cfg(feature = "integration-tests")]
mod tests {
	use epcis_event_hash::canon::context_loader::BundledContextLoader;
	use epcis_event_hash::canon::identifier;
	use epcis_event_hash::canon::pipeline::{compute_prehash_from_json_str, compute_prehash_from_xml_str};

	const S1: &str = r#"<EPCISDocument><EPCISBody><EventList>
		<ObjectEvent>
			<eventTime>2020-03-04T11:00:30.000+01:00</eventTime>
			<eventTimeZoneOffset>+01:00</eventTimeZoneOffset>
			<epcList>
				<epc>urn:epc:id:sscc:4012345.0000000333</epc>
				<epc>urn:epc:id:sscc:4012345.0000000111</epc>
				<epc>urn:epc:id:sscc:4012345.0000000222</epc>
			</epcList>
			<action>OBSERVE</action>
			<bizStep>urn:epcglobal:cbv:bizstep:departing</bizStep>
			<readPoint><id>urn:epc:id:sgln:4012345.00011.987</id></readPoint>
		</ObjectEvent>
	</EventList></EPCISBody></EPCISDocument>"#;

	fn one_prehash(xml: &str) -> String {
		compute_prehash_from_xml_str(xml, "").unwrap().into_iter().next().unwrap()
	}

	#[test]
	fn s1_epc_permutation_does_not_change_hash() {
		let permuted = r#"<EPCISDocument><EPCISBody><EventList>
			<ObjectEvent>
				<eventTime>2020-03-04T11:00:30.000+01:00</eventTime>
				<eventTimeZoneOffset>+01:00</eventTimeZoneOffset>
				<epcList>
					<epc>urn:epc:id:sscc:4012345.0000000111</epc>
					<epc>urn:epc:id:sscc:4012345.0000000222</epc>
					<epc>urn:epc:id:sscc:4012345.0000000333</epc>
				</epcList>
				<action>OBSERVE</action>
				<bizStep>urn:epcglobal:cbv:bizstep:departing</bizStep>
				<readPoint><id>urn:epc:id:sgln:4012345.00011.987</id></readPoint>
			</ObjectEvent>
		</EventList></EPCISBody></EPCISDocument>"#;
		assert_eq!(one_prehash(S1), one_prehash(permuted));
	}

	#[test]
	fn s1_record_time_addition_does_not_change_hash() {
		let with_record_time = r#"<EPCISDocument><EPCISBody><EventList>
			<ObjectEvent>
				<eventTime>2020-03-04T11:00:30.000+01:00</eventTime>
				<eventTimeZoneOffset>+01:00</eventTimeZoneOffset>
				<recordTime>2020-03-04T12:00:00.000+01:00</recordTime>
				<epcList>
					<epc>urn:epc:id:sscc:4012345.0000000333</epc>
					<epc>urn:epc:id:sscc:4012345.0000000111</epc>
					<epc>urn:epc:id:sscc:4012345.0000000222</epc>
				</epcList>
				<action>OBSERVE</action>
				<bizStep>urn:epcglobal:cbv:bizstep:departing</bizStep>
				<readPoint><id>urn:epc:id:sgln:4012345.00011.987</id></readPoint>
			</ObjectEvent>
		</EventList></EPCISBody></EPCISDocument>"#;
		assert_eq!(one_prehash(S1), one_prehash(with_record_time));
	}

	#[test]
	fn s1_sscc_digital_link_rewrite_does_not_change_hash() {
		let digital_link = identifier::normalize("urn:epc:id:sscc:4012345.0000000333").unwrap();
		let rewritten = S1.replace(
			"<epc>urn:epc:id:sscc:4012345.0000000333</epc>",
			&format!("<epc>{}</epc>", digital_link),
		);
		assert_eq!(one_prehash(S1), one_prehash(&rewritten));
	}

	#[test]
	fn s1_timestamp_utc_form_does_not_change_hash() {
		let utc_form = S1.replace("2020-03-04T11:00:30.000+01:00", "2020-03-04T10:00:30Z").replace("<eventTimeZoneOffset>+01:00</eventTimeZoneOffset>", "<eventTimeZoneOffset>+00:00</eventTimeZoneOffset>");
		assert_eq!(one_prehash(S1), one_prehash(&utc_form));
	}

	#[tokio::test]
	async fn s2_json_form_matches_xml_form() {
		let json = r#"{
			"epcisBody": { "eventList": [
				{ "type": "ObjectEvent",
				  "eventTime": "2020-03-04T11:00:30.000+01:00",
				  "eventTimeZoneOffset": "+01:00",
				  "epcList": [
					"urn:epc:id:sscc:4012345.0000000333",
					"urn:epc:id:sscc:4012345.0000000111",
					"urn:epc:id:sscc:4012345.0000000222"
				  ],
				  "action": "OBSERVE",
				  "bizStep": "shipping",
				  "readPoint": { "id": "urn:epc:id:sgln:4012345.00011.987" }
				}
			]}
		}"#;
		let loader = BundledContextLoader::new();
		let from_json = compute_prehash_from_json_str(json, &loader, "").await.unwrap();

		let xml_shipping = S1.replace("urn:epcglobal:cbv:bizstep:departing", "urn:epcglobal:cbv:bizstep:shipping");
		let from_xml = compute_prehash_from_xml_str(&xml_shipping, "").unwrap();
		assert_eq!(from_json, from_xml);
	}

	#[test]
	fn s3_paired_biz_transaction_list_order_sensitivity() {
		let xml_template = |first_type: &str, first_val: &str, second_type: &str, second_val: &str| {
			format!(
				r#"<EPCISDocument><EPCISBody><EventList><ObjectEvent>
					<action>OBSERVE</action>
					<bizTransactionList>
						<bizTransaction type="{}">{}</bizTransaction>
						<bizTransaction type="{}">{}</bizTransaction>
					</bizTransactionList>
				</ObjectEvent></EventList></EPCISBody></EPCISDocument>"#,
				first_type, first_val, second_type, second_val
			)
		};
		let a = xml_template("po", "http://example.com/12345678", "inv", "http://example.com/inv/99");
		let b = xml_template("inv", "http://example.com/12345678", "po", "http://example.com/inv/99");
		assert_ne!(one_prehash(&a), one_prehash(&b));
	}

	#[test]
	fn s4_sgtin_check_digit() {
		let result = identifier::normalize("urn:epc:id:sgtin:4012345.011111.987").unwrap();
		assert_eq!(result, "https://id.gs1.org/01/04012345111118/21/987");
	}

	#[test]
	fn s5_digital_link_canonicalization_drops_query_and_pads_gtin() {
		let result = identifier::normalize("https://example.org/01/9780345418913/21/765tz?11=221109").unwrap();
		assert_eq!(result, "https://id.gs1.org/01/09780345418913/21/765tz");
	}

	#[test]
	fn s6_lot_dropped_when_serial_present() {
		let result = identifier::normalize("https://example.org/01/9780345418913/10/LOT/21/SER").unwrap();
		assert_eq!(result, "https://id.gs1.org/01/09780345418913/21/SER");
	}

	#[test]
	fn property_numeric_canonicalization_forms_agree() {
		let base = r#"<EPCISDocument><EPCISBody><EventList><ObjectEvent>
			<action>OBSERVE</action>
			<quantityList><quantityElement>
				<epcClass>urn:epc:idpat:sgtin:4012345.011111.*</epcClass>
				<quantity>{Q}</quantity>
			</quantityElement></quantityList>
		</ObjectEvent></EventList></EPCISBody></EPCISDocument>"#;
		let forms = ["3", "+3", "003", "3.0"];
		let hashes: Vec<String> = forms.iter().map(|q| one_prehash(&base.replace("{Q}", q))).collect();
		assert!(hashes.windows(2).all(|w| w[0] == w[1]));
	}

	#[test]
	fn property_ignore_set_leaves_hash_unchanged() {
		let base = r#"<EPCISDocument><EPCISBody><EventList>
			<ObjectEvent><eventID>{ID}</eventID><action>OBSERVE</action></ObjectEvent>
		</EventList></EPCISBody></EPCISDocument>"#;
		let a = one_prehash(&base.replace("{ID}", "ni:///sha-256;aaaa?ver=CBV2.0"));
		let b = one_prehash(&base.replace("{ID}", "ni:///sha-256;bbbb?ver=CBV2.0"));
		assert_eq!(a, b);
	}

	#[test]
	fn property_extension_sibling_order_does_not_change_hash() {
		let a = r#"<EPCISDocument><EPCISBody><EventList><ObjectEvent>
			<action>OBSERVE</action>
			<ext:one xmlns:ext="https://example.com/ext">1</ext:one>
			<ext:two xmlns:ext="https://example.com/ext">2</ext:two>
		</ObjectEvent></EventList></EPCISBody></EPCISDocument>"#;
		let b = r#"<EPCISDocument><EPCISBody><EventList><ObjectEvent>
			<action>OBSERVE</action>
			<ext:two xmlns:ext="https://example.com/ext">2</ext:two>
			<ext:one xmlns:ext="https://example.com/ext">1</ext:one>
		</ObjectEvent></EventList></EPCISBody></EPCISDocument>"#;
		assert_eq!(one_prehash(a), one_prehash(b));
	}
}
