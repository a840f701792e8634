//! ISO 4217 reference data used to decorate the codes reported by the rate provider.

use crate::models::CurrencyInfo;

/// (code, English name, en_US display symbol). `None` means the code itself is the symbol.
/// Sorted by code.
const CURRENCY_TABLE: &[(&str, &str, Option<&str>)] = &[
    ("AED", "UAE Dirham", None),
    ("AFN", "Afghani", None),
    ("ALL", "Lek", None),
    ("AMD", "Armenian Dram", None),
    ("ANG", "Netherlands Antillean Guilder", None),
    ("AOA", "Kwanza", None),
    ("ARS", "Argentine Peso", None),
    ("AUD", "Australian Dollar", Some("A$")),
    ("AWG", "Aruban Florin", None),
    ("AZN", "Azerbaijan Manat", None),
    ("BAM", "Convertible Mark", None),
    ("BBD", "Barbados Dollar", None),
    ("BDT", "Taka", None),
    ("BGN", "Bulgarian Lev", None),
    ("BHD", "Bahraini Dinar", None),
    ("BIF", "Burundi Franc", None),
    ("BMD", "Bermudian Dollar", None),
    ("BND", "Brunei Dollar", None),
    ("BOB", "Boliviano", None),
    ("BRL", "Brazilian Real", Some("R$")),
    ("BSD", "Bahamian Dollar", None),
    ("BTN", "Ngultrum", None),
    ("BWP", "Pula", None),
    ("BYN", "Belarusian Ruble", None),
    ("BZD", "Belize Dollar", None),
    ("CAD", "Canadian Dollar", Some("CA$")),
    ("CDF", "Congolese Franc", None),
    ("CHF", "Swiss Franc", None),
    ("CLP", "Chilean Peso", None),
    ("CNY", "Yuan Renminbi", Some("CN¥")),
    ("COP", "Colombian Peso", None),
    ("CRC", "Costa Rican Colon", None),
    ("CUP", "Cuban Peso", None),
    ("CVE", "Cabo Verde Escudo", None),
    ("CZK", "Czech Koruna", None),
    ("DJF", "Djibouti Franc", None),
    ("DKK", "Danish Krone", None),
    ("DOP", "Dominican Peso", None),
    ("DZD", "Algerian Dinar", None),
    ("EGP", "Egyptian Pound", None),
    ("ERN", "Nakfa", None),
    ("ETB", "Ethiopian Birr", None),
    ("EUR", "Euro", Some("€")),
    ("FJD", "Fiji Dollar", None),
    ("GBP", "Pound Sterling", Some("£")),
    ("GEL", "Lari", None),
    ("GHS", "Ghana Cedi", None),
    ("GIP", "Gibraltar Pound", None),
    ("GMD", "Dalasi", None),
    ("GNF", "Guinean Franc", None),
    ("GTQ", "Quetzal", None),
    ("GYD", "Guyana Dollar", None),
    ("HKD", "Hong Kong Dollar", Some("HK$")),
    ("HNL", "Lempira", None),
    ("HTG", "Gourde", None),
    ("HUF", "Forint", None),
    ("IDR", "Rupiah", None),
    ("ILS", "New Israeli Sheqel", Some("₪")),
    ("INR", "Indian Rupee", Some("₹")),
    ("IQD", "Iraqi Dinar", None),
    ("IRR", "Iranian Rial", None),
    ("ISK", "Iceland Krona", None),
    ("JMD", "Jamaican Dollar", None),
    ("JOD", "Jordanian Dinar", None),
    ("JPY", "Yen", Some("¥")),
    ("KES", "Kenyan Shilling", None),
    ("KGS", "Som", None),
    ("KHR", "Riel", None),
    ("KMF", "Comorian Franc", None),
    ("KRW", "Won", Some("₩")),
    ("KWD", "Kuwaiti Dinar", None),
    ("KYD", "Cayman Islands Dollar", None),
    ("KZT", "Tenge", None),
    ("LAK", "Lao Kip", None),
    ("LBP", "Lebanese Pound", None),
    ("LKR", "Sri Lanka Rupee", None),
    ("LRD", "Liberian Dollar", None),
    ("LSL", "Loti", None),
    ("LYD", "Libyan Dinar", None),
    ("MAD", "Moroccan Dirham", None),
    ("MDL", "Moldovan Leu", None),
    ("MGA", "Malagasy Ariary", None),
    ("MKD", "Denar", None),
    ("MMK", "Kyat", None),
    ("MNT", "Tugrik", None),
    ("MOP", "Pataca", None),
    ("MRU", "Ouguiya", None),
    ("MUR", "Mauritius Rupee", None),
    ("MVR", "Rufiyaa", None),
    ("MWK", "Malawi Kwacha", None),
    ("MXN", "Mexican Peso", Some("MX$")),
    ("MYR", "Malaysian Ringgit", None),
    ("MZN", "Mozambique Metical", None),
    ("NAD", "Namibia Dollar", None),
    ("NGN", "Naira", None),
    ("NIO", "Cordoba Oro", None),
    ("NOK", "Norwegian Krone", None),
    ("NPR", "Nepalese Rupee", None),
    ("NZD", "New Zealand Dollar", Some("NZ$")),
    ("OMR", "Rial Omani", None),
    ("PAB", "Balboa", None),
    ("PEN", "Sol", None),
    ("PGK", "Kina", None),
    ("PHP", "Philippine Peso", Some("₱")),
    ("PKR", "Pakistan Rupee", None),
    ("PLN", "Zloty", None),
    ("PYG", "Guarani", None),
    ("QAR", "Qatari Rial", None),
    ("RON", "Romanian Leu", None),
    ("RSD", "Serbian Dinar", None),
    ("RUB", "Russian Ruble", None),
    ("RWF", "Rwanda Franc", None),
    ("SAR", "Saudi Riyal", None),
    ("SBD", "Solomon Islands Dollar", None),
    ("SCR", "Seychelles Rupee", None),
    ("SDG", "Sudanese Pound", None),
    ("SEK", "Swedish Krona", None),
    ("SGD", "Singapore Dollar", None),
    ("SOS", "Somali Shilling", None),
    ("SRD", "Surinam Dollar", None),
    ("SSP", "South Sudanese Pound", None),
    ("SYP", "Syrian Pound", None),
    ("SZL", "Lilangeni", None),
    ("THB", "Baht", None),
    ("TJS", "Somoni", None),
    ("TMT", "Turkmenistan New Manat", None),
    ("TND", "Tunisian Dinar", None),
    ("TOP", "Pa'anga", None),
    ("TRY", "Turkish Lira", None),
    ("TTD", "Trinidad and Tobago Dollar", None),
    ("TWD", "New Taiwan Dollar", Some("NT$")),
    ("TZS", "Tanzanian Shilling", None),
    ("UAH", "Hryvnia", None),
    ("UGX", "Uganda Shilling", None),
    ("USD", "US Dollar", Some("$")),
    ("UYU", "Peso Uruguayo", None),
    ("UZS", "Uzbekistan Sum", None),
    ("VES", "Bolívar Soberano", None),
    ("VND", "Dong", Some("₫")),
    ("VUV", "Vatu", None),
    ("WST", "Tala", None),
    ("XAF", "CFA Franc BEAC", Some("FCFA")),
    ("XCD", "East Caribbean Dollar", Some("EC$")),
    ("XOF", "CFA Franc BCEAO", Some("F\u{202f}CFA")),
    ("XPF", "CFP Franc", Some("CFPF")),
    ("YER", "Yemeni Rial", None),
    ("ZAR", "Rand", None),
    ("ZMW", "Zambian Kwacha", None),
    ("ZWL", "Zimbabwe Dollar", None),
];

fn lookup(code: &str) -> Option<&'static (&'static str, &'static str, Option<&'static str>)> {
    CURRENCY_TABLE
        .binary_search_by(|(c, _, _)| (*c).cmp(code))
        .ok()
        .map(|idx| &CURRENCY_TABLE[idx])
}

/// Regional indicator flag for the first two letters of a code, "" if they are not letters.
pub fn flag_emoji(code: &str) -> String {
    let prefix: Vec<char> = code.chars().take(2).collect();
    if prefix.len() != 2 || !prefix.iter().all(|c| c.is_ascii_alphabetic()) {
        return String::new();
    }
    prefix
        .iter()
        .filter_map(|c| char::from_u32(0x1F1E6 + (c.to_ascii_uppercase() as u32 - 'A' as u32)))
        .collect()
}

/// Display metadata for a code. Unknown codes degrade to the code as name and `"<CODE> "` as symbol.
pub fn describe(code: &str) -> CurrencyInfo {
    let (name, symbol) = match lookup(code) {
        Some((c, name, symbol)) => (name.to_string(), symbol.unwrap_or(c).to_string()),
        None => (code.to_string(), format!("{} ", code)),
    };

    CurrencyInfo {
        code: code.to_string(),
        name,
        symbol,
        emoji: flag_emoji(code),
    }
}
