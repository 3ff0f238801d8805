//! "10,000 Krabby Patties": Plankton places a giant order, the kitchen
//! scales out with twenty sous-chefs, delivery becomes the bottleneck and
//! Mr. Krabs reassigns staff to clear the queue.
//!
//! One tick is half a second at normal speed; the script ends at tick 150.

use orgreplay_types::{
    ActCatalog, ActChangeData, ActDef, EventBody, NodeStatus, NodeStatusData, ParticipantId,
    ParticipantProfile, ParticipantRegistry, ReplayEvent, SpawnData, SpawnedAgent, StatUpdateData,
    TransferData,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Last tick of the script.
pub const END_TICK: u64 = 150;

/// Participant whose team reassigned staff join.
pub const DELIVERY_LEAD: &str = "squidward-tentacles";

/// Participant that carries the order-queue badge.
pub const QUEUE_OWNER: &str = "squidward-tentacles";

// ---------------------------------------------------------------------------
// Event builders
// ---------------------------------------------------------------------------

fn say(tick: u64, from: &str, text: &str) -> ReplayEvent {
    ReplayEvent::new(tick, EventBody::Message(TransferData::said(from, text)))
}

fn delegate(tick: u64, from: &str, to: &str, text: &str) -> ReplayEvent {
    ReplayEvent::new(tick, EventBody::Delegation(TransferData::between(from, to, text)))
}

fn escalate(tick: u64, from: &str, to: &str, text: &str) -> ReplayEvent {
    ReplayEvent::new(tick, EventBody::Escalation(TransferData::between(from, to, text)))
}

fn complete(tick: u64, from: &str, text: &str) -> ReplayEvent {
    ReplayEvent::new(tick, EventBody::Completion(TransferData::said(from, text)))
}

fn reassign(tick: u64, from: &str, to: &str, text: &str) -> ReplayEvent {
    ReplayEvent::new(
        tick,
        EventBody::Reassign(TransferData::between(from, to, text).joining(DELIVERY_LEAD)),
    )
}

fn status(tick: u64, agent: &str, status: NodeStatus) -> ReplayEvent {
    ReplayEvent::new(
        tick,
        EventBody::NodeStatus(NodeStatusData {
            agent: ParticipantId::new(agent),
            status,
        }),
    )
}

fn act(tick: u64, act: u32) -> ReplayEvent {
    ReplayEvent::new(
        tick,
        EventBody::ActChange(ActChangeData {
            act,
            name: None,
            narrative: None,
        }),
    )
}

fn stats(tick: u64, fields: &[(&str, Decimal)]) -> ReplayEvent {
    ReplayEvent::new(
        tick,
        EventBody::StatUpdate(StatUpdateData::from_pairs(fields.iter().copied())),
    )
}

fn sous_chef(tick: u64, n: u32) -> ReplayEvent {
    ReplayEvent::new(
        tick,
        EventBody::Spawn(SpawnData {
            spawn_agent: SpawnedAgent {
                id: ParticipantId::new(format!("sous-chef-{n}")),
                parent_id: ParticipantId::new("spongebob-squarepants"),
                name: format!("Sous Chef #{n}"),
                emoji: "⭐".to_owned(),
                avatar_url: Some(avatar("patrick")),
            },
        }),
    )
}

fn avatar(name: &str) -> String {
    format!("/avatars/{name}.png")
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// The full event script, tick-ordered.
#[allow(clippy::too_many_lines)]
pub fn timeline() -> Vec<ReplayEvent> {
    use NodeStatus::Working;

    let mut events = vec![
        // Act I: The Order (ticks 0-10)
        act(0, 0),
        say(1, "plankton", "I need 10,000 Krabby Patties. By end of day. 💰💰💰"),
        say(2, "mr-krabs", "10,000?! 💰💰💰 MONEY MONEY MONEY!"),
        status(2, "mr-krabs", Working),
        stats(
            3,
            &[
                ("kitchenRate", dec!(0)),
                ("deliveryRate", dec!(0)),
                ("queueSize", dec!(0)),
                ("revenue", dec!(0)),
                ("margin", dec!(0)),
                ("budgetUsed", dec!(0)),
                ("pattiesProduced", dec!(0)),
                ("pattiesDelivered", dec!(0)),
            ],
        ),
        delegate(4, "mr-krabs", "spongebob-squarepants", "SpongeBob! Fire up every grill! 10,000 patties!"),
        status(4, "spongebob-squarepants", Working),
        delegate(6, "mr-krabs", "squidward-tentacles", "Squidward! You're on delivery. Move it!"),
        status(6, "squidward-tentacles", Working),
        delegate(8, "mr-krabs", "squilliam-fancyson", "Squilliam, track every penny. I want P&L on my desk."),
        status(8, "squilliam-fancyson", Working),
        say(10, "spongebob-squarepants", "I'M READY! I'M READY! I'M READY!"),
        // Act II: Hiring the Kitchen (ticks 11-40)
        act(11, 1),
        say(12, "spongebob-squarepants", "10,000 patties?! I can't do this with just Patrick and Sandy..."),
        escalate(13, "spongebob-squarepants", "mr-krabs", "Mr. Krabs! I need to spin up sous-chef instances. 20 of them!"),
        say(14, "mr-krabs", "20?! That's 50 credits each! 💸💸💸"),
        say(15, "spongebob-squarepants", "It's 1,000 credits... or we miss the order and lose 50,000."),
        say(16, "mr-krabs", "...fine. But they're TEMPORARY! sessions_spawn, 20 instances. Go!"),
        delegate(17, "spongebob-squarepants", "sandy-cheeks", "Sandy, architect the pipeline. I'm spinning up the team!"),
        status(17, "sandy-cheeks", Working),
        say(18, "sandy-cheeks", "3-stage pipeline: prep → grill → plate. Each sous-chef gets a lane."),
        sous_chef(19, 1),
        stats(
            19,
            &[
                ("kitchenRate", dec!(5)),
                ("pattiesProduced", dec!(10)),
                ("deliveryRate", dec!(8)),
                ("pattiesDelivered", dec!(5)),
                ("queueSize", dec!(5)),
                ("revenue", dec!(25)),
                ("budgetUsed", dec!(5)),
            ],
        ),
        sous_chef(19, 2),
        sous_chef(20, 3),
        sous_chef(20, 4),
        stats(
            20,
            &[
                ("kitchenRate", dec!(15)),
                ("pattiesProduced", dec!(40)),
                ("queueSize", dec!(20)),
            ],
        ),
        say(20, "karen", "Running security scan on Plankton's order... 🔒"),
        status(20, "karen", Working),
        sous_chef(21, 5),
        sous_chef(21, 6),
        sous_chef(21, 7),
        sous_chef(22, 8),
        sous_chef(22, 9),
        sous_chef(22, 10),
        stats(
            22,
            &[
                ("kitchenRate", dec!(40)),
                ("pattiesProduced", dec!(150)),
                ("queueSize", dec!(80)),
                ("revenue", dec!(375)),
                ("budgetUsed", dec!(10)),
            ],
        ),
        say(22, "spongebob-squarepants", "10 sous-chefs online! Production RAMPING! 🚀"),
        sous_chef(23, 11),
        sous_chef(23, 12),
        sous_chef(23, 13),
        sous_chef(24, 14),
        sous_chef(24, 15),
        stats(
            24,
            &[
                ("kitchenRate", dec!(65)),
                ("pattiesProduced", dec!(400)),
                ("queueSize", dec!(250)),
                ("revenue", dec!(1000)),
                ("budgetUsed", dec!(15)),
            ],
        ),
        sous_chef(25, 16),
        sous_chef(25, 17),
        sous_chef(25, 18),
        sous_chef(26, 19),
        sous_chef(26, 20),
        stats(
            26,
            &[
                ("kitchenRate", dec!(100)),
                ("pattiesProduced", dec!(700)),
                ("queueSize", dec!(500)),
                ("revenue", dec!(1750)),
                ("budgetUsed", dec!(20)),
            ],
        ),
        say(27, "spongebob-squarepants", "🔥 ALL 20 SOUS-CHEFS ONLINE! Production at 100/tick! I'M READY!"),
        status(27, "patrick-star", Working),
        delegate(28, "sandy-cheeks", "gary", "Gary, QA every 10th patty. Reject anything substandard."),
        status(28, "gary", Working),
        say(28, "gary", "Meow. 🔍 (QA initialized)"),
        say(29, "perch-perkins", "📺 BREAKING: SpongeBob just hired 20 SOUS-CHEFS! Kitchen is a MACHINE!"),
        status(29, "perch-perkins", Working),
        stats(
            30,
            &[
                ("kitchenRate", dec!(100)),
                ("pattiesProduced", dec!(1100)),
                ("pattiesDelivered", dec!(180)),
                ("queueSize", dec!(920)),
                ("revenue", dec!(2750)),
                ("budgetUsed", dec!(22)),
            ],
        ),
        say(32, "gary", "Meow! ✅ Batch 4 passed. ❌ Batch 5 rejected, bun alignment off."),
        say(34, "squidward-tentacles", "Table 7... table 12... table 3... why are there SO MANY patties?! *sigh*"),
        say(36, "squilliam-fancyson", "Sous-chef costs: 1,000cr. Kitchen throughput: 100/tick. ROI looks solid. 📊"),
        stats(
            38,
            &[
                ("kitchenRate", dec!(100)),
                ("pattiesProduced", dec!(1900)),
                ("pattiesDelivered", dec!(450)),
                ("queueSize", dec!(1450)),
                ("revenue", dec!(4750)),
                ("margin", dec!(4.2)),
                ("budgetUsed", dec!(28)),
            ],
        ),
        stats(
            40,
            &[
                ("kitchenRate", dec!(100)),
                ("pattiesProduced", dec!(2500)),
                ("pattiesDelivered", dec!(600)),
                ("queueSize", dec!(1900)),
                ("revenue", dec!(6250)),
                ("budgetUsed", dec!(32)),
            ],
        ),
    ];

    events.extend(bottleneck());
    events.extend(decision());
    events.extend(victory());
    events
}

/// Act III: The Bottleneck (ticks 41-90).
fn bottleneck() -> Vec<ReplayEvent> {
    use NodeStatus::{Busy, Overwhelmed, Working};

    vec![
        act(41, 2),
        say(42, "squidward-tentacles", "These patties are piling up faster than I can carry them!"),
        status(42, "squidward-tentacles", Busy),
        // The script reports fewer patties produced than at tick 40 here.
        stats(
            45,
            &[
                ("queueSize", dec!(1200)),
                ("pattiesProduced", dec!(2000)),
                ("pattiesDelivered", dec!(600)),
                ("revenue", dec!(3000)),
            ],
        ),
        say(48, "squidward-tentacles", "ORDER UP! ...wait, wrong table. 😤"),
        stats(
            50,
            &[
                ("queueSize", dec!(1500)),
                ("pattiesProduced", dec!(2600)),
                ("pattiesDelivered", dec!(800)),
                ("revenue", dec!(4000)),
                ("budgetUsed", dec!(35)),
            ],
        ),
        say(52, "barnacle-boy", "⚠️ Support tickets spiking! Customers complaining about wait times."),
        status(52, "barnacle-boy", Working),
        stats(
            55,
            &[
                ("queueSize", dec!(1800)),
                ("pattiesProduced", dec!(3200)),
                ("pattiesDelivered", dec!(1000)),
                ("kitchenRate", dec!(50)),
                ("deliveryRate", dec!(8)),
            ],
        ),
        say(56, "squidward-tentacles", "My back... my feet... my will to live... 😩"),
        status(56, "squidward-tentacles", Overwhelmed),
        say(58, "flying-dutchman", "👻 Even I wouldn't haunt someone working this hard."),
        stats(
            60,
            &[
                ("queueSize", dec!(2100)),
                ("pattiesProduced", dec!(3800)),
                ("pattiesDelivered", dec!(1200)),
                ("revenue", dec!(6000)),
                ("budgetUsed", dec!(42)),
            ],
        ),
        say(62, "larry-the-lobster", "Squidward looks like he needs a protein shake... and a stretcher."),
        stats(
            65,
            &[
                ("queueSize", dec!(2400)),
                ("pattiesProduced", dec!(4300)),
                ("pattiesDelivered", dec!(1400)),
            ],
        ),
        say(68, "squidward-tentacles", "That's IT. I can't take it anymore!"),
        escalate(70, "squidward-tentacles", "mr-krabs", "🚨 I CAN'T DELIVER 10,000 BY MYSELF! THE QUEUE IS AT 2500!"),
        stats(70, &[("queueSize", dec!(2500))]),
        say(72, "spongebob-squarepants", "Kitchen team is idling... nowhere to PUT the patties! Pipeline backed up."),
        stats(72, &[("kitchenRate", dec!(30))]),
        say(75, "mr-krabs", "Hmm... we have a delivery bottleneck. Think, Krabs, think! 🤔"),
        say(78, "perch-perkins", "📺 UPDATE: Delays reported at Krusty Krab. Customers growing restless."),
        stats(
            80,
            &[
                ("queueSize", dec!(2600)),
                ("pattiesProduced", dec!(5000)),
                ("pattiesDelivered", dec!(1800)),
                ("kitchenRate", dec!(25)),
                ("revenue", dec!(9000)),
                ("budgetUsed", dec!(50)),
            ],
        ),
        say(82, "bubble-bass", "You forgot my PICKLES! And I've been waiting 45 MINUTES!"),
        say(85, "barnacle-boy", "⚠️ 47 open support tickets. Satisfaction dropping fast."),
        say(88, "karen", "Plankton accessed our order API 23 times so far. Monitoring... 👀"),
        stats(
            90,
            &[
                ("queueSize", dec!(2700)),
                ("pattiesProduced", dec!(5500)),
                ("pattiesDelivered", dec!(2100)),
                ("revenue", dec!(10500)),
                ("margin", dec!(3.8)),
                ("budgetUsed", dec!(55)),
            ],
        ),
    ]
}

/// Act IV: The Decision (ticks 91-120).
fn decision() -> Vec<ReplayEvent> {
    use NodeStatus::{Busy, Working};

    vec![
        act(91, 3),
        say(92, "mr-krabs", "I've made me decision! Pearl! Fred! You're on delivery NOW!"),
        say(93, "squilliam-fancyson", "⚠️ Overtime costs will eat into margins, sir."),
        say(94, "mr-krabs", "Better thin margins than NO margins! MOVE IT!"),
        reassign(95, "mr-krabs", "pearl-krabs", "Pearl reassigned to delivery team"),
        status(95, "pearl-krabs", Working),
        reassign(96, "mr-krabs", "fred-1", "Fred reassigned to delivery team"),
        status(96, "fred-1", Working),
        say(97, "pearl-krabs", "Ugh, FINE daddy. But I'm getting overtime pay! 💅"),
        say(98, "fred-1", "MY LEG! I mean, I'm on it!"),
        stats(
            100,
            &[
                ("deliveryRate", dec!(15)),
                ("queueSize", dec!(2500)),
                ("pattiesDelivered", dec!(2500)),
                ("kitchenRate", dec!(35)),
                ("revenue", dec!(12500)),
                ("budgetUsed", dec!(60)),
            ],
        ),
        say(103, "squidward-tentacles", "Oh thank Neptune, reinforcements!"),
        status(103, "squidward-tentacles", Busy),
        stats(
            105,
            &[
                ("deliveryRate", dec!(20)),
                ("queueSize", dec!(2200)),
                ("pattiesProduced", dec!(6200)),
                ("pattiesDelivered", dec!(3200)),
                ("revenue", dec!(16000)),
            ],
        ),
        stats(
            108,
            &[
                ("deliveryRate", dec!(25)),
                ("queueSize", dec!(1800)),
                ("pattiesDelivered", dec!(3800)),
                ("revenue", dec!(19000)),
                ("budgetUsed", dec!(68)),
            ],
        ),
        say(110, "spongebob-squarepants", "Queue is draining! Kitchen back to full speed! 🔥"),
        stats(
            110,
            &[
                ("kitchenRate", dec!(50)),
                ("queueSize", dec!(1500)),
                ("pattiesProduced", dec!(6800)),
                ("pattiesDelivered", dec!(4500)),
                ("revenue", dec!(22500)),
            ],
        ),
        stats(
            113,
            &[
                ("queueSize", dec!(1200)),
                ("pattiesDelivered", dec!(5200)),
                ("revenue", dec!(26000)),
            ],
        ),
        say(115, "squilliam-fancyson", "Delivery throughput tripled. Costs up 18% but revenue recovering. 📈"),
        stats(
            118,
            &[
                ("queueSize", dec!(800)),
                ("pattiesProduced", dec!(7500)),
                ("pattiesDelivered", dec!(6200)),
                ("revenue", dec!(31000)),
                ("budgetUsed", dec!(75)),
            ],
        ),
        status(118, "squidward-tentacles", Working),
        stats(
            120,
            &[
                ("queueSize", dec!(500)),
                ("pattiesProduced", dec!(8000)),
                ("pattiesDelivered", dec!(7000)),
                ("revenue", dec!(35000)),
                ("margin", dec!(3.6)),
                ("budgetUsed", dec!(80)),
            ],
        ),
    ]
}

/// Act V: Victory (ticks 121-150).
fn victory() -> Vec<ReplayEvent> {
    let mut events = vec![
        act(121, 4),
        stats(
            122,
            &[
                ("queueSize", dec!(300)),
                ("pattiesProduced", dec!(8500)),
                ("pattiesDelivered", dec!(7800)),
                ("revenue", dec!(39000)),
            ],
        ),
        stats(
            125,
            &[
                ("queueSize", dec!(150)),
                ("pattiesProduced", dec!(9000)),
                ("pattiesDelivered", dec!(8500)),
                ("revenue", dec!(42500)),
                ("budgetUsed", dec!(85)),
            ],
        ),
        say(127, "karen", "Plankton accessed our API 47 times. No breach detected. He just really likes patties. 🔒"),
        stats(
            128,
            &[
                ("queueSize", dec!(50)),
                ("pattiesProduced", dec!(9500)),
                ("pattiesDelivered", dec!(9200)),
                ("revenue", dec!(46000)),
            ],
        ),
        stats(
            130,
            &[
                ("queueSize", dec!(20)),
                ("pattiesProduced", dec!(9800)),
                ("pattiesDelivered", dec!(9600)),
            ],
        ),
        say(132, "perch-perkins", "📺 RECORD ORDER at the Krusty Krab! 10,000 patties, unprecedented!"),
        stats(
            135,
            &[
                ("queueSize", dec!(0)),
                ("kitchenRate", dec!(0)),
                ("deliveryRate", dec!(0)),
                ("pattiesProduced", dec!(10000)),
                ("pattiesDelivered", dec!(9800)),
                ("revenue", dec!(49000)),
                ("budgetUsed", dec!(90)),
            ],
        ),
        stats(
            137,
            &[("pattiesDelivered", dec!(10000)), ("revenue", dec!(50000))],
        ),
        complete(138, "spongebob-squarepants", "🎉 10,000 KRABBY PATTIES DELIVERED! WE DID IT!"),
        say(139, "squilliam-fancyson", "Final P&L: Revenue 50,000cr. Costs 48,200cr. Margin 3.6%. 📊"),
        stats(140, &[("margin", dec!(3.6)), ("budgetUsed", dec!(96))]),
        say(141, "mr-krabs", "I'll take it! 💰💰💰 Every penny counts!"),
        say(143, "squidward-tentacles", "*collapses behind the counter* ...never again. 😵"),
        status(143, "squidward-tentacles", NodeStatus::Idle),
        say(145, "patrick-star", "Can we do 20,000 tomorrow? 🤩"),
        say(146, "squidward-tentacles", "NO."),
        say(147, "plankton", "Hmm... next time I'll order 20,000. HAHAHAHA!"),
    ];

    // Everyone still lit goes green.
    events.extend(
        [
            "mr-krabs",
            "spongebob-squarepants",
            "squilliam-fancyson",
            "sandy-cheeks",
            "karen",
            "patrick-star",
            "gary",
            "pearl-krabs",
            "perch-perkins",
            "barnacle-boy",
            "fred-1",
        ]
        .into_iter()
        .map(|agent| status(148, agent, NodeStatus::Idle)),
    );
    events.push(complete(150, "mr-krabs", "Operation: 10,000 Krabby Patties, COMPLETE. 🍔"));
    events
}

// ---------------------------------------------------------------------------
// Participants and acts
// ---------------------------------------------------------------------------

/// `(id, name, emoji, avatar, reports_to)` in chart order.
const PARTICIPANTS: &[(&str, &str, &str, Option<&str>, Option<&str>)] = &[
    ("mr-krabs", "Mr. Krabs", "🦀", Some("mr-krabs"), None),
    ("spongebob-squarepants", "SpongeBob", "🧽", Some("spongebob"), Some("mr-krabs")),
    ("squidward-tentacles", "Squidward", "🐙", Some("squidward"), Some("mr-krabs")),
    ("squilliam-fancyson", "Squilliam", "🎩", Some("squilliam"), Some("mr-krabs")),
    ("sandy-cheeks", "Sandy", "🐿️", Some("sandy"), Some("spongebob-squarepants")),
    ("karen", "Karen", "🖥️", Some("karen"), Some("spongebob-squarepants")),
    ("pearl-krabs", "Pearl", "🐳", Some("pearl"), Some("squidward-tentacles")),
    ("perch-perkins", "Perch Perkins", "🐟", None, Some("squidward-tentacles")),
    ("barnacle-boy", "Barnacle Boy", "🦸", Some("barnacle-boy"), Some("squidward-tentacles")),
    ("plankton", "Plankton", "🦠", Some("plankton"), Some("squilliam-fancyson")),
    ("mrs-puff", "Mrs. Puff", "🐠", Some("mrs-puff"), Some("squilliam-fancyson")),
    ("patrick-star", "Patrick", "⭐", Some("patrick"), Some("sandy-cheeks")),
    ("gary", "Gary", "🐌", Some("gary"), Some("sandy-cheeks")),
    ("plankton-jr", "Plankton Jr", "🧫", None, Some("sandy-cheeks")),
    ("mermaid-man", "Mermaid Man", "🦸‍♂️", Some("mermaid-man"), Some("karen")),
    ("larry-the-lobster", "Larry", "🦞", Some("larry"), Some("perch-perkins")),
    ("bubble-bass", "Bubble Bass", "🐡", None, Some("perch-perkins")),
    ("dennis", "Dennis", "🕶️", None, Some("perch-perkins")),
    ("flying-dutchman", "Flying Dutchman", "👻", Some("flying-dutchman"), Some("barnacle-boy")),
    ("fred-1", "Fred", "🧑", None, Some("barnacle-boy")),
    ("fred-2", "Fred 2", "🧑", None, Some("barnacle-boy")),
    ("fred-3", "Fred 3", "🧑", None, Some("barnacle-boy")),
];

/// Registered participants with their reporting lines.
pub fn registry() -> ParticipantRegistry {
    PARTICIPANTS
        .iter()
        .map(|&(id, name, emoji, avatar_name, reports_to)| ParticipantProfile {
            id: ParticipantId::new(id),
            name: name.to_owned(),
            emoji: emoji.to_owned(),
            avatar_url: avatar_name.map(avatar),
            reports_to: reports_to.map(ParticipantId::new),
        })
        .collect()
}

/// The five acts, indexed from 0.
pub fn acts() -> ActCatalog {
    let defs = [
        ("Act I: The Order", "Plankton walks in with the order of a lifetime."),
        (
            "Act II: Hiring the Kitchen",
            "SpongeBob spins up 20 sous-chef instances. The org chart explodes.",
        ),
        (
            "Act III: The Bottleneck",
            "Squidward can't keep up. The queue grows. Tensions rise.",
        ),
        ("Act IV: The Decision", "Mr. Krabs reorganizes. Reinforcements arrive."),
        ("Act V: Victory", "The last patty delivered. Bikini Bottom celebrates."),
    ];
    ActCatalog::new(
        defs.into_iter()
            .map(|(name, narrative)| ActDef {
                name: name.to_owned(),
                narrative: narrative.to_owned(),
            })
            .collect(),
    )
}
