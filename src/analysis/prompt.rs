//! Prompt construction and transcript rendering for the analysis panel.

/// Verification prompt sent once per uploaded document, with the full
/// extracted text appended.
pub fn checklist_prompt(full_text: &str) -> String {
    format!(
        r#"
Kamu adalah asisten AI untuk memverifikasi dokumen klaim BPJS. Berikut ini adalah 5 dokumen yang WAJIB ADA:

1. SURAT RUJUKAN FKTP
2. SEP (SURAT ELEGIBILITAS PESERTA)
3. KARTU BPJS
4. KARTU KTP
5. RESUME MEDIS

(OPSIONAL)
6. LABORATORIUM
7. RADIOLOGI

Cocokkan daftar di atas dengan daftar nama dokumen yang dikirim user. Nama bisa berbeda, misalnya:
- "Resume" cocok dengan "RESUME MEDIS"
- "Lab" cocok dengan "HASIL LABORATORIUM"

JIKA YANG TIDAK ADA YANG BAGIAN OPSIONAL MAKA STATUS SIAP DIKIRIM KE BPJS

Tampilkan hasil seperti ini (tanpa tambahan kata di luar format berikut):

TIDAK ADA SEP
TIDAK ADA KARTU BPJS
RESUME MEDIS SESUAI
HASIL LABORATORIUM SESUAI
TIDAK ADA RADIOLOGI

JIKA SESUAI SEMUA MAKA TAMBAHKAN KATA SIAP BOLD DI PALING BAWAH

DAN JIKA ADA YANG TIDAK SESUAI BUAT KATA AGAR MENYARANKAN MEREVISI

Daftar dokumen dari user:
{}
"#,
        full_text
    )
}

/// Follow-up prompt: the full document text, the user's question, and a
/// locally recomputed per-page check the model is told to preserve.
pub fn followup_prompt(full_text: &str, page_check: &str, question: &str) -> String {
    format!(
        r#"
Kamu adalah asisten AI yang ahli dalam menganalisis dokumen klaim BPJS Kesehatan.

Jawab pertanyaan user berdasarkan isi dokumen BPJS berikut ini:

KONTEN DOKUMEN:
{}

PERTANYAAN USER:
{}

JANGAN PERNAH MENGUBAH FORMAT HASIL ANALISA HALAMAN. Pastikan hasil selalu dimulai dengan:
{}
"#,
        full_text, question, page_check
    )
}

/// One `Halaman N : Sesuai|Tidak Sesuai` line per page. A page matches
/// when it mentions "klaim bpjs", case-insensitively.
pub fn page_check(pages: &[String]) -> String {
    pages
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let matches = text.to_lowercase().contains("klaim bpjs");
            format!(
                "Halaman {} : {}",
                index + 1,
                if matches { "Sesuai" } else { "Tidak Sesuai" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the model's lightweight markup as HTML for the transcript view:
/// `**bold**`, `*italic*`, and newlines.
pub fn render_markup(text: &str) -> String {
    let bold = replace_pairs(text, "**", "<strong>", "</strong>");
    let italic = replace_pairs(&bold, "*", "<em>", "</em>");
    italic.replace('\n', "<br>")
}

/// Replace non-overlapping `delim`-delimited pairs; an unmatched trailing
/// delimiter is left as-is.
fn replace_pairs(input: &str, delim: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find(delim) {
        let after = &rest[start + delim.len()..];
        match after.find(delim) {
            Some(end) => {
                out.push_str(&rest[..start]);
                out.push_str(open);
                out.push_str(&after[..end]);
                out.push_str(close);
                rest = &after[end + delim.len()..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}
