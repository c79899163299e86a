//! Authored archive contents.

use super::{Directory, FileNode, FileStatus};
use crate::truth::TruthCategory;

use FileStatus::{Encrypted, Intact, Restricted, RestrictedBriefing, Unstable};
use TruthCategory::{
    BeingContainment, DebrisRelocation, InternationalActors, TelepathicScouts, Transition2026,
};

pub(super) fn archive() -> Directory {
    Directory::new("")
        .dir(internal())
        .dir(storage())
        .dir(ops())
        .dir(comms())
        .dir(admin())
        .dir(tmp())
}

fn internal() -> Directory {
    Directory::new("internal")
        .dir(
            Directory::new("protocol").file(FileNode::new(
                "session_protocol.txt",
                Intact,
                &[
                    "SESSION PROTOCOL - REMOTE ARCHIVE TERMINAL",
                    "",
                    "1. Navigate with cd. List with ls.",
                    "2. Read records with open <filename>.",
                    "3. Encrypted records require decrypt <filename>.",
                    "4. Damaged records may be restored with recover <filename>.",
                    "5. Every action is logged. Excess activity is flagged.",
                    "",
                    "Administrative functions require protocol override.",
                    "Override codes are distributed by courier only.",
                ],
            )),
        )
        .dir(
            Directory::new("admin")
                .file(FileNode::new(
                    "maintenance_notes.txt",
                    Intact,
                    &[
                        "MAINTENANCE LOG - TERMINAL 7",
                        "",
                        "- replaced tape heads in bay 2",
                        "- legacy utilities still installed: disconnect, scan, decode",
                        "- nobody remembers who wrote them",
                        "- do NOT run decode on the psi partition",
                        "- operator scripts: save_evidence.sh, purge_trace.sh (use run)",
                    ],
                ))
                .file(FileNode::new(
                    "printer_queue.log",
                    Intact,
                    &[
                        "PRINT QUEUE",
                        "job 4411  memo_cafeteria.doc   done",
                        "job 4412  roster_jan96.doc     done",
                        "job 4413  transfer_form_b.doc  CANCELLED BY ADMIN",
                    ],
                )),
        )
        .dir(
            Directory::new("misc")
                .file(FileNode::new(
                    "parking_memo.txt",
                    Intact,
                    &[
                        "MEMO: Parking lot B closed Jan 20-23.",
                        "Military vehicles have priority access.",
                        "Staff should use the east lot.",
                    ],
                ))
                .file(FileNode::new(
                    "cafeteria_rotation.txt",
                    Intact,
                    &[
                        "CAFETERIA ROTATION - JANUARY 1996",
                        "Mon: feijoada   Tue: frango   Wed: peixe",
                        "Thu: closed (unscheduled inspection)",
                        "Fri: pao de queijo",
                    ],
                )),
        )
        .dir(
            Directory::new("sanitized").file(FileNode::new(
                "incident_summary_official.txt",
                Intact,
                &[
                    "OFFICIAL INCIDENT SUMMARY - RELEASED TO PRESS",
                    "",
                    "On 20 January 1996 local residents reported an unusual figure.",
                    "Investigation concluded the figure was a local man",
                    "with a mental disability, crouching in the rain.",
                    "No military operation took place.",
                    "No materials were recovered.",
                    "CASE CLOSED.",
                ],
            )),
        )
}

fn storage() -> Directory {
    Directory::new("storage")
        .dir(
            Directory::new("assets")
                .file(
                    FileNode::new(
                        "transport_log_96.txt",
                        Intact,
                        &[
                            "TRANSPORT LOG - ESA CONVOY 03",
                            "",
                            "20-JAN-96 22:40  crates A1-A4 loaded at Jardim Andere",
                            "21-JAN-96 03:15  arrival Tres Coracoes, escort changed",
                            "21-JAN-96 09:00  crates A1, A2 forwarded to Campinas",
                            "22-JAN-96 14:30  crate A3 held for foreign inspection",
                            "22-JAN-96 16:05  crate A4 manifest destroyed on order",
                            "",
                            "Cargo description: structural debris, non-terrestrial alloy.",
                            "Handling: no civilian personnel within 200m.",
                        ],
                    )
                    .reveals(&[DebrisRelocation]),
                )
                .file(
                    FileNode::new(
                        "material_x_analysis.dat",
                        Unstable,
                        &[
                            "MATERIAL ANALYSIS - SAMPLE X-7",
                            "",
                            "Origin: recovery site, Varginha MG",
                            "Mass: 3.2 kg recovered fragments",
                            "Density: 0.41 g/cm3",
                            "Tensile strength: exceeds reference alloys by 40x",
                            "Thermal response: none observed at 1400 C",
                            "Surface: glyph-like etching, non-repeating",
                            "Composition: unknown lattice, trace gallium",
                            "Magnetic: inert",
                            "Memory behaviour: returns to shape after deformation",
                            "",
                            "Conclusion: not of terrestrial manufacture.",
                            "Recommendation: relocate all fragments off site.",
                            "Distribution: restricted.",
                            "END OF REPORT",
                        ],
                    )
                    .reveals(&[DebrisRelocation])
                    .image("/images/material-x.png", "Sample X-7 under magnification"),
                )
                .file(FileNode::new(
                    "transfer_authorization.txt",
                    Intact,
                    &[
                        "TRANSFER AUTHORIZATION FORM B",
                        "",
                        "Authorising officer: Col. [REDACTED]",
                        "Destination: Campinas / Sao Paulo",
                        "Verification phrase for courier: varginha1996",
                        "Destroy after reading.",
                    ],
                ))
                .file(FileNode::new(
                    "cargo_manifest.txt",
                    Intact,
                    &[
                        "CARGO MANIFEST - ROUTINE",
                        "12 crates medical supplies",
                        "4 crates [SEE TRANSPORT LOG]",
                        "2 drums decontaminant",
                    ],
                )),
        )
        .dir(
            Directory::new("quarantine")
                .file(
                    FileNode::new(
                        "bio_container.log",
                        Unstable,
                        &[
                            "BIO CONTAINMENT LOG - UNIT 2",
                            "",
                            "20-JAN 23:10  subject 1 received, alive, unresponsive",
                            "21-JAN 01:00  subject 1 moved to sealed container",
                            "21-JAN 04:30  strong ammonia odour reported",
                            "21-JAN 08:00  subject 2 received from fire brigade",
                            "21-JAN 09:45  subject 2 vital signs weakening",
                            "21-JAN 12:20  staff report headaches, nausea",
                            "22-JAN 02:00  subject 2 deceased",
                            "22-JAN 06:00  remains transferred to Campinas",
                            "22-JAN 07:30  container decontaminated",
                            "23-JAN 10:00  subject 1 transferred, destination sealed",
                            "",
                            "Staff exposed: 6. All placed under observation.",
                            "This log must not leave the facility.",
                            "END LOG",
                        ],
                    )
                    .reveals(&[BeingContainment]),
                )
                .file(
                    FileNode::new(
                        "autopsy_alpha.log",
                        Intact,
                        &[
                            "PRELIMINARY EXAMINATION - SUBJECT ALPHA",
                            "",
                            "Height: 1.6 m. Skin: brown, oily.",
                            "Head: enlarged, three ridges.",
                            "Eyes: large, red, no visible pupils.",
                            "Limbs: thin, three digits per hand.",
                            "Internal structure: partially unclassifiable.",
                            "Cause of death: respiratory failure (probable).",
                            "",
                            "Tissue samples retained for telepathic response study.",
                            "Examiner note: subject was aware until the end.",
                        ],
                    )
                    .reveals(&[BeingContainment])
                    .image("/images/autopsy-alpha.png", "Examination photograph, subject alpha"),
                )
                .file(FileNode::new(
                    "surveillance_recovery.vid",
                    Intact,
                    &[
                        "SURVEILLANCE RECOVERY - CAMERA 4",
                        "Footage timestamp: 21-JAN-96 03:02",
                        "Duration: 00:00:48",
                        "[Playback available]",
                    ],
                )
                .video("/videos/surveillance-recovery.mp4", "Camera 4, loading bay", "green")),
        )
}

fn ops() -> Directory {
    Directory::new("ops")
        .dir(
            Directory::new("prato").file(FileNode::new(
                "field_report_prato.txt",
                Intact,
                &[
                    "FIELD REPORT - OPERATION PRATO ARCHIVE",
                    "Reference: Colares 1977, lights over the river.",
                    "Cross-reference requested by Varginha task group.",
                    "Pattern similarity: high.",
                ],
            )),
        )
        .dir(
            Directory::new("exo").file(FileNode::new(
                "exo_recovery_notes.txt",
                Intact,
                &[
                    "EXO RECOVERY NOTES",
                    "Recovery teams deployed: 3",
                    "Fire brigade involvement: unplanned, contained",
                    "Witnesses: three young women, neighbourhood residents",
                    "Witness management: discredit via press",
                ],
            )),
        )
        .dir(
            Directory::new("medical").file(
                FileNode::new(
                    "specimen_triage.txt",
                    Intact,
                    &[
                        "SPECIMEN TRIAGE - HOSPITAL REGIONAL",
                        "Two specimens admitted under military escort.",
                        "Specimen 2 isolated after staff contamination.",
                        "Attending officer died 15-FEB-96, infection, unexplained.",
                    ],
                )
                .reveals(&[BeingContainment]),
            ),
        )
        .dir(
            Directory::new("assessments")
                .file(
                    FileNode::new(
                        "window_assessment.enc",
                        Encrypted,
                        &["#$%&@! 0x4F 0x2A ...", "[CIPHERTEXT]"],
                    )
                    .fragment(&[
                        "THREAT WINDOW ASSESSMENT",
                        "",
                        "Recovered communications reference a future date.",
                        "Our best reading: a transition in 2026.",
                        "Nature of the transition: unknown.",
                        "All recovered intelligence points to the same window.",
                    ])
                    .decrypt_threshold(3)
                    .reveals(&[Transition2026]),
                )
                .file(
                    FileNode::new(
                        "threat_briefing.txt",
                        RestrictedBriefing,
                        &[
                            "BRIEFING - EYES ONLY",
                            "The 2026 window is not negotiable.",
                            "Prepare continuity plans.",
                        ],
                    )
                    .threshold(4)
                    .reveals(&[Transition2026]),
                ),
        )
        .dir(
            Directory::new("quarantine").file(FileNode::new(
                "early_containment_status.txt",
                Intact,
                &[
                    "[EARLY SESSION ONLY]",
                    "CONTAINMENT STATUS - LIVE FEED",
                    "Unit 2 sealed.",
                    "Unit 3 awaiting second subject.",
                    "Transfer convoy on standby.",
                    "Next update: 0600.",
                ],
            )),
        )
}

fn comms() -> Directory {
    Directory::new("comms")
        .dir(
            Directory::new("psi")
                .file(
                    FileNode::new(
                        "transcript_core.enc",
                        Encrypted,
                        &["@@ 0x91 0x03 ## PSI-CORE ##", "[CIPHERTEXT]"],
                    )
                    .fragment(&[
                        "PSI SESSION TRANSCRIPT - CORE",
                        "",
                        "Session 4. Subject 1 non-verbal.",
                        "Technician reports hearing words without sound.",
                        "Words: 'we are not the last'.",
                        "Two technicians report the same image: a field, empty.",
                        "Subject appears to map the room without looking.",
                        "EEG of both technicians synchronised for 11 seconds.",
                        "Assessment: scouts. Telepathic reconnaissance.",
                        "Session terminated at subject's initiative.",
                        "",
                        "Recommendation: no further unshielded sessions.",
                    ])
                    .question(
                        "Courier verification phrase on the transfer form?",
                        &["varginha1996", "varginha 1996"],
                        "The storage paperwork carries it.",
                    )
                    .reveals(&[TelepathicScouts]),
                )
                .file(
                    FileNode::new(
                        "neural_dump.psi",
                        Encrypted,
                        &["~~~ NEURAL PATTERN BUFFER ~~~", "[CIPHERTEXT]"],
                    )
                    .fragment(&[
                        "NEURAL PATTERN DUMP",
                        "",
                        "Residual pattern captured from subject 1.",
                        "Pattern remains responsive to structured queries.",
                        "Interface: link",
                    ])
                    .question(
                        "Operation that preceded Varginha (river, 1977)?",
                        &["prato", "operation prato", "operacao prato"],
                        "Field reports in /ops/ reference it.",
                    ),
                )
                .file(FileNode::new(
                    "psi_residue.log",
                    Intact,
                    &[
                        "PSI RESIDUE MONITOR",
                        "Background activity: elevated since 20-JAN",
                        "Source: unidentified, local",
                    ],
                )),
        )
        .dir(
            Directory::new("liaison").threshold(2).file(
                FileNode::new(
                    "foreign_liaison_memo.txt",
                    Intact,
                    &[
                        "LIAISON MEMO - CONFIDENTIAL",
                        "",
                        "Foreign delegation arrived 22-JAN via Campinas.",
                        "Crate A3 inspected jointly.",
                        "Delegation requested tissue samples. Request granted.",
                        "Multi-lateral protocol 7 in effect.",
                    ],
                )
                .reveals(&[InternationalActors]),
            ),
        )
        .dir(
            Directory::new("intercepts").file(FileNode::new(
                "morse_intercept.sig",
                Intact,
                &[
                    "SIGNAL INTERCEPT - 21-JAN-96 02:14",
                    "",
                    "..- ..-. --- / .-. . -.-. --- ...- . .-. . -..",
                    "",
                    "Transmission origin: military band, local.",
                ],
            ))
            .file(FileNode::new(
                "encoded_transmission.txt",
                Intact,
                &[
                    "INTERCEPTED TRANSMISSION - ENCODED",
                    "DATE: 1996-01-21 03:47",
                    "",
                    "  Gur gehgu vf abg jung gurl gbyq lbh.",
                    "",
                    "Cipher: classical substitution. Key not recovered.",
                ],
            )),
        )
}

fn admin() -> Directory {
    Directory::new("admin")
        .threshold(2)
        .file(FileNode::new(
            "active_trace.sys",
            Intact,
            &[
                "SECURITY ALERT - ACTIVE TRACE INITIATED",
                "",
                "An automated protocol has detected a remote session.",
                "Trace-back in progress.",
                "",
                "Operators may purge trace buffers with purge_trace.sh.",
            ],
        ))
        .file(
            FileNode::new(
                "trace_purge_memo.txt",
                Restricted,
                &[
                    "MEMO - PURGE PROCEDURE",
                    "",
                    "Any remote session reaching the archive is to be traced.",
                    "Files referencing the 2026 window are to be purged.",
                    "Transition planning continues under separate cover.",
                ],
            )
            .reveals(&[Transition2026]),
        )
        .file(FileNode::new(
            "neural_fragment.dat",
            Restricted,
            &[
                "NEURAL FRAGMENT - RECONSTRUCTION SOURCE",
                "Status: incomplete. Requires script reconstruction.",
                "TARGET designation: neural_fragment",
            ],
        ))
        .file(FileNode::new(
            "access_roster.txt",
            Restricted,
            &[
                "ACCESS ROSTER",
                "Level 5: 3 officers",
                "Level 4: 9 officers",
                "Remote terminals: 1 (this one)",
            ],
        ))
}

fn tmp() -> Directory {
    Directory::new("tmp")
        .file(FileNode::new(
            "session_residue.log",
            Intact,
            &[
                "session 0x3f closed abnormally",
                "user: ufo74 (unregistered)",
                "commands: ls, cd, open, override",
            ],
        ))
        .file(FileNode::new(
            "note_to_self.tmp",
            Intact,
            &["remember: the word for harvest.", "in portuguese."],
        ))
        .file(FileNode::new(
            "pattern_recognition.log",
            Intact,
            &[
                "PATTERN RECOGNITION",
                "Recurring term across files: COLHEITA",
                "Confidence: 0.87",
            ],
        ))
        .file(FileNode::new(
            "data_reconstruction.util",
            Intact,
            &[
                "DATA RECONSTRUCTION UTILITY",
                "usage: script INIT; TARGET=<name>; EXEC",
            ],
        ))
        .file(FileNode::new(
            "URGENT_classified_alpha.txt",
            Intact,
            &[
                "THIS FILE HAS BEEN FLAGGED",
                "ACCESS REPORTED TO SECURITY",
                "HONEYPOT 01",
            ],
        ))
        .file(FileNode::new(
            "SMOKING_GUN_proof.txt",
            Intact,
            &["ACCESS LOGGED", "TRACE INITIATED", "HONEYPOT 04"],
        ))
}
