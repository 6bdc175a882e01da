diesel::table! {
    league (id) {
        id -> Int4,
        code -> Varchar,
        name -> Varchar,
        country -> Varchar,
        level -> Varchar,
    }
}

diesel::table! {
    championship (id) {
        id -> Int4,
        code -> Varchar,
        name -> Varchar,
        year -> Int4,
        kind -> Varchar,
    }
}

diesel::table! {
    clubs (id) {
        id -> Int4,
        code -> Varchar,
        name -> Varchar,
        city -> Varchar,
    }
}

diesel::table! {
    national_team (id) {
        id -> Int4,
        code -> Varchar,
        country -> Varchar,
        confederation -> Nullable<Varchar>,
    }
}

diesel::table! {
    player (id) {
        id -> Int4,
        code -> Varchar,
        name -> Varchar,
        date_of_birth -> Date,
        height -> Nullable<Float8>,
        citizenship -> Nullable<Varchar>,
        current_club_id -> Nullable<Int4>,
    }
}

diesel::table! {
    game (id) {
        id -> Int4,
        code -> Varchar,
        game_date -> Date,
        location -> Varchar,
        game_type -> Varchar,
        season -> Nullable<Varchar>,
        league_id -> Nullable<Int4>,
        championship_id -> Nullable<Int4>,
    }
}

diesel::table! {
    game_participant (game_id, participant_id, participant_type) {
        game_id -> Int4,
        participant_id -> Int4,
        participant_type -> Varchar,
        score -> Int4,
        role -> Nullable<Varchar>,
    }
}

diesel::table! {
    player_game_stats (game_id, player_id) {
        game_id -> Int4,
        player_id -> Int4,
        two_pt_made -> Int4,
        two_pt_attempted -> Int4,
        three_pt_made -> Int4,
        three_pt_attempted -> Int4,
        ft_made -> Int4,
        ft_attempted -> Int4,
        assists -> Int4,
        rebounds -> Int4,
        blocks -> Int4,
    }
}

diesel::joinable!(player -> clubs (current_club_id));
diesel::joinable!(game -> league (league_id));
diesel::joinable!(game -> championship (championship_id));
diesel::joinable!(game_participant -> game (game_id));
diesel::joinable!(player_game_stats -> game (game_id));
diesel::joinable!(player_game_stats -> player (player_id));

diesel::allow_tables_to_appear_in_same_query!(
    league,
    championship,
    clubs,
    national_team,
    player,
    game,
    game_participant,
    player_game_stats,
);
